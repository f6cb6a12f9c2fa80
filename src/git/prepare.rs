//! Repository preparation
//!
//! Brings a local clone to the remote tip of its default branch, cloning on
//! first use. Safe to call repeatedly on the same path.

use super::command::GitSettings;
use super::repo::GitRepo;
use crate::error::{Error, Result};
use crate::types::DefaultBranch;
use std::path::Path;
use tracing::{debug, info};

/// Remote every prepared clone tracks
pub const ORIGIN: &str = "origin";

/// Ensure `path` holds a clone of `url` checked out on its default branch at
/// the remote tip
///
/// A fresh clone is already at the tip and is returned as is. An existing
/// clone is fetched, hard-reset, switched to the default branch and
/// fast-forwarded. "Nothing new" from fetch or pull is not an error.
pub async fn prepare_repository(
    url: &str,
    path: &Path,
    default_branch: &DefaultBranch,
    settings: &GitSettings,
) -> Result<GitRepo> {
    if needs_clone(path) {
        let branch = match default_branch {
            DefaultBranch::Named(name) => Some(name.as_str()),
            DefaultBranch::Auto => None,
        };
        return GitRepo::clone_from(url, path, branch, settings.clone()).await;
    }

    info!(url, path = %path.display(), "resetting existing clone");
    let repo = GitRepo::open(path, settings.clone())?;

    let fetched = repo.fetch_all().await?;
    debug!(?fetched, "fetched remotes");

    repo.hard_reset().await?;

    let branch = match default_branch {
        DefaultBranch::Named(name) => name.clone(),
        DefaultBranch::Auto => repo.remote_default_branch(ORIGIN).await?,
    };
    let local = format!("refs/heads/{branch}");
    let tracking = format!("refs/remotes/{ORIGIN}/{branch}");
    if repo.ref_exists(&tracking)? {
        repo.force_checkout_tracking(&branch, ORIGIN).await?;
    } else if repo.ref_exists(&local)? {
        repo.force_checkout(&branch).await?;
    } else {
        return Err(Error::RefResolution(format!(
            "default branch '{branch}' not found in {}",
            path.display()
        )));
    }

    let pulled = repo.pull_ff_only().await?;
    debug!(branch, ?pulled, "pulled default branch");

    Ok(repo)
}

/// A path that does not exist yet, or an empty directory, gets a fresh clone
fn needs_clone(path: &Path) -> bool {
    match std::fs::read_dir(path) {
        Ok(mut entries) => entries.next().is_none(),
        Err(_) => !path.exists(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_needs_clone_missing_path() {
        let temp = TempDir::new().unwrap();
        assert!(needs_clone(&temp.path().join("repo")));
    }

    #[test]
    fn test_needs_clone_empty_dir() {
        let temp = TempDir::new().unwrap();
        assert!(needs_clone(temp.path()));
    }

    #[test]
    fn test_needs_clone_populated_dir() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("file"), "x").unwrap();
        assert!(!needs_clone(temp.path()));
    }

    #[tokio::test]
    async fn test_populated_non_repo_is_access_error() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("file"), "x").unwrap();

        let result = prepare_repository(
            "file:///nonexistent",
            temp.path(),
            &DefaultBranch::Auto,
            &GitSettings::default(),
        )
        .await;

        assert!(matches!(result, Err(Error::RepositoryAccess { .. })));
    }
}
