//! Hosting services for GitHub and GitLab
//!
//! Provides a unified merge-on-green request across platforms.

mod detection;
mod factory;
mod github;
mod gitlab;
mod noop;

pub use detection::{detect_platform, parse_repo_info, split_repo_url};
pub use factory::{HostingOptions, create_hosting_service};
pub use github::GitHubService;
pub use gitlab::GitLabService;
pub use noop::NoopHostingService;

use crate::error::Result;
use async_trait::async_trait;

/// Hosting service trait for merge-on-green requests
///
/// This trait abstracts GitHub and GitLab, allowing the automerge workflow
/// to hand its integration branch to either platform.
#[async_trait]
pub trait HostingService: Send + Sync {
    /// Ask the host to merge `source_branch` into `target_branch` of the
    /// repository at `repo_url` once required checks pass
    ///
    /// Returns once the host has accepted the request; it does not wait for
    /// the merge itself.
    async fn trigger_merge_on_green(
        &self,
        repo_url: &str,
        source_branch: &str,
        target_branch: &str,
    ) -> Result<()>;
}

/// Title used for pull/merge requests opened by forksync
pub(crate) fn request_title(source_branch: &str, target_branch: &str) -> String {
    format!("Sync upstream into {target_branch} ({source_branch})")
}

/// Body used for pull/merge requests opened by forksync
pub(crate) fn request_body(source_branch: &str) -> String {
    format!(
        "Automated upstream sync.\n\nBranch `{source_branch}` merges the latest upstream state \
         into this fork and will be merged automatically once required checks pass."
    )
}
