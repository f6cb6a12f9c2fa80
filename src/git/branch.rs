//! Branch porcelain
//!
//! Branch creation is two ref/config writes plus a working tree switch. The
//! composite [`create_and_checkout_branch`] always writes the ref before
//! touching the working tree and stops at the first failure.

use super::prepare::ORIGIN;
use super::repo::GitRepo;
use crate::error::{Error, Result};
use tracing::info;

/// Create `refs/heads/<name>` at `from` and record `origin` as its upstream
///
/// Fails with [`Error::BranchAlreadyExists`] without touching an existing
/// branch.
pub async fn create_branch(repo: &GitRepo, name: &str, from: &gix::oid) -> Result<()> {
    if repo.ref_exists(&format!("refs/heads/{name}"))? {
        return Err(Error::BranchAlreadyExists(name.to_string()));
    }

    repo.create_ref(name, from).await?;
    repo.set_config(&format!("branch.{name}.remote"), ORIGIN)
        .await?;
    repo.set_config(&format!("branch.{name}.merge"), &format!("refs/heads/{name}"))
        .await?;

    info!(branch = name, commit = %from, "created branch");
    Ok(())
}

/// Switch the working tree to an existing local branch
pub async fn checkout_branch(repo: &GitRepo, name: &str) -> Result<()> {
    repo.checkout(name).await
}

/// Create a branch at `from`, then check it out
pub async fn create_and_checkout_branch(repo: &GitRepo, name: &str, from: &gix::oid) -> Result<()> {
    create_branch(repo, name, from).await?;
    checkout_branch(repo, name).await
}

/// Commit a fully-qualified ref (e.g. `refs/remotes/origin/master`) points at
pub fn get_branch_hash(repo: &GitRepo, full_ref: &str) -> Result<gix::ObjectId> {
    repo.resolve_ref(full_ref)
}
