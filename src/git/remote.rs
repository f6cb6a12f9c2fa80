//! Remote registry

use super::repo::GitRepo;
use crate::error::Result;
use crate::types::RemoteStatus;
use tracing::info;

/// Make sure a remote called `name` exists, adding it with `url` if not
///
/// An existing remote is left alone even when it points somewhere else.
pub async fn ensure_remote(repo: &GitRepo, name: &str, url: &str) -> Result<RemoteStatus> {
    if repo.remote_names()?.iter().any(|existing| existing == name) {
        return Ok(RemoteStatus::Existing);
    }

    repo.add_remote(name, url).await?;
    info!(remote = name, url, "added remote");
    Ok(RemoteStatus::Created)
}
