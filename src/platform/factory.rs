//! Hosting service factory

use crate::auth::{get_github_auth, get_gitlab_auth};
use crate::error::Result;
use crate::platform::{GitHubService, GitLabService, HostingService, NoopHostingService};
use crate::types::HostingProvider;
use tracing::debug;

/// Provider-specific settings for building a hosting service
#[derive(Debug, Clone, Default)]
pub struct HostingOptions {
    /// GitHub Enterprise host (None for github.com)
    pub github_host: Option<String>,
    /// Self-hosted GitLab host (None for gitlab.com)
    pub gitlab_host: Option<String>,
}

/// Create the hosting service selected by `provider`
///
/// Looks up credentials for GitHub and GitLab; `none` needs nothing.
pub async fn create_hosting_service(
    provider: HostingProvider,
    options: &HostingOptions,
) -> Result<Box<dyn HostingService>> {
    debug!(%provider, "creating hosting service");
    match provider {
        HostingProvider::GitHub => {
            let auth = get_github_auth(options.github_host.as_deref()).await?;
            debug!(source = ?auth.source, "using GitHub token");
            Ok(Box::new(GitHubService::new(
                &auth.token,
                options.github_host.clone(),
            )?))
        }
        HostingProvider::GitLab => {
            let auth = get_gitlab_auth(options.gitlab_host.as_deref()).await?;
            debug!(source = ?auth.source, "using GitLab token");
            Ok(Box::new(GitLabService::new(
                auth.token,
                options.gitlab_host.clone(),
            )?))
        }
        HostingProvider::None => Ok(Box::new(NoopHostingService)),
    }
}
