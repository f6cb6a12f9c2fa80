//! Hosting service that accepts every request

use crate::error::Result;
use crate::platform::HostingService;
use async_trait::async_trait;
use tracing::info;

/// Hosting service that does nothing and always succeeds
///
/// Used with provider `none`: the integration branch is pushed and left for
/// a human to open a request.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHostingService;

#[async_trait]
impl HostingService for NoopHostingService {
    async fn trigger_merge_on_green(
        &self,
        repo_url: &str,
        source_branch: &str,
        target_branch: &str,
    ) -> Result<()> {
        info!(
            repo_url,
            source_branch, target_branch, "no hosting provider configured, skipping merge-on-green"
        );
        Ok(())
    }
}
