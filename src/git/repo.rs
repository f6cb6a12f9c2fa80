//! Repository handle
//!
//! Read-only inspection (opening, listing remotes, resolving refs) goes
//! through gix. Anything that touches the working tree, the network or a
//! ref goes through the git executable.

use super::command::{GitCommand, GitFailure, GitOutput, GitSettings};
use crate::error::{Error, Result};
use crate::types::{CommitIdentity, MergeOutcome, SyncOutcome};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A local working copy
#[derive(Debug, Clone)]
pub struct GitRepo {
    path: PathBuf,
    settings: GitSettings,
}

impl GitRepo {
    /// Open an existing working copy
    pub fn open(path: impl Into<PathBuf>, settings: GitSettings) -> Result<Self> {
        let path = path.into();
        gix::open(&path).map_err(|e| Error::RepositoryAccess {
            path: path.clone(),
            message: e.to_string(),
        })?;
        Ok(Self { path, settings })
    }

    /// Clone `url` into `path`, optionally checking out `branch`
    pub async fn clone_from(
        url: &str,
        path: &Path,
        branch: Option<&str>,
        settings: GitSettings,
    ) -> Result<Self> {
        let access_err = |message: String| Error::RepositoryAccess {
            path: path.to_path_buf(),
            message,
        };

        let parent = path
            .parent()
            .ok_or_else(|| access_err("clone path has no parent directory".to_string()))?;
        std::fs::create_dir_all(parent)
            .map_err(|e| access_err(format!("failed to create {}: {e}", parent.display())))?;

        let mut args = vec!["clone".to_string()];
        if let Some(branch) = branch {
            args.push("--branch".to_string());
            args.push(branch.to_string());
        }
        args.push("--".to_string());
        args.push(url.to_string());
        args.push(path.to_string_lossy().into_owned());

        info!(url, path = %path.display(), "cloning repository");
        GitCommand::new(parent, args)
            .timeout(settings.network_timeout)
            .run()
            .await
            .map_err(|e| match (branch, e) {
                (Some(branch), GitFailure::Exit { ref stderr, .. })
                    if stderr.contains("Remote branch") && stderr.contains("not found") =>
                {
                    Error::RefResolution(format!("default branch '{branch}' not found in {url}"))
                }
                (_, other) => access_err(format!("failed to clone {url}: {other}")),
            })?;

        Self::open(path, settings)
    }

    /// Root of the working copy
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn git<I, S>(&self, args: I) -> GitCommand<'_>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        GitCommand::new(&self.path, args)
    }

    async fn run_local<I, S>(&self, args: I) -> std::result::Result<GitOutput, GitFailure>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.git(args).run().await
    }

    async fn run_network<I, S>(&self, args: I) -> std::result::Result<GitOutput, GitFailure>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.git(args)
            .timeout(self.settings.network_timeout)
            .run()
            .await
    }

    fn gix(&self) -> Result<gix::Repository> {
        gix::open(&self.path).map_err(|e| Error::RepositoryAccess {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Names of all configured remotes
    pub fn remote_names(&self) -> Result<Vec<String>> {
        let repo = self
            .gix()
            .map_err(|e| Error::RemoteList(e.to_string()))?;
        Ok(repo
            .remote_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect())
    }

    /// Resolve a fully-qualified ref name to the commit it points at
    pub fn resolve_ref(&self, full_name: &str) -> Result<gix::ObjectId> {
        let repo = self.gix()?;
        let reference = repo
            .try_find_reference(full_name)
            .map_err(|e| Error::RefResolution(format!("{full_name}: {e}")))?
            .ok_or_else(|| Error::RefResolution(full_name.to_string()))?;
        let id = reference
            .into_fully_peeled_id()
            .map_err(|e| Error::RefResolution(format!("{full_name}: {e}")))?;
        Ok(id.detach())
    }

    /// Whether a fully-qualified ref exists
    pub fn ref_exists(&self, full_name: &str) -> Result<bool> {
        let repo = self.gix()?;
        let found = repo
            .try_find_reference(full_name)
            .map_err(|e| Error::RefResolution(format!("{full_name}: {e}")))?;
        Ok(found.is_some())
    }

    /// Commit currently checked out
    pub async fn head(&self) -> Result<String> {
        let out = self
            .run_local(["rev-parse", "HEAD"])
            .await
            .map_err(|e| Error::RefResolution(format!("HEAD in {}: {e}", self.path.display())))?;
        Ok(out.stdout.trim().to_string())
    }

    /// Whether the working tree and index match HEAD
    pub async fn is_clean(&self) -> Result<bool> {
        let out = self
            .run_local(["status", "--porcelain"])
            .await
            .map_err(|e| Error::RepositoryAccess {
                path: self.path.clone(),
                message: format!("status failed: {e}"),
            })?;
        Ok(out.stdout.trim().is_empty())
    }

    /// Branch `refs/remotes/<remote>/HEAD` points at, short name
    ///
    /// Asks the remote and records its answer when the symbolic ref is
    /// missing locally.
    pub async fn remote_default_branch(&self, remote: &str) -> Result<String> {
        let symref = format!("refs/remotes/{remote}/HEAD");
        let read = || self.run_local(["symbolic-ref", "--quiet", symref.as_str()]);

        let target = match read().await {
            Ok(out) => out.stdout,
            Err(_) => {
                debug!(remote, "remote HEAD missing, asking the remote");
                self.run_network(["remote", "set-head", remote, "--auto"])
                    .await
                    .map_err(|e| Error::RefResolution(format!("{symref}: {e}")))?;
                read()
                    .await
                    .map_err(|e| Error::RefResolution(format!("{symref}: {e}")))?
                    .stdout
            }
        };

        let prefix = format!("refs/remotes/{remote}/");
        target
            .trim()
            .strip_prefix(&prefix)
            .map(ToString::to_string)
            .ok_or_else(|| Error::RefResolution(format!("{symref} points at {}", target.trim())))
    }

    async fn ref_snapshot(&self, pattern: &str) -> Result<String> {
        let out = self
            .run_local(["for-each-ref", "--format=%(objectname) %(refname)", pattern])
            .await
            .map_err(|e| Error::Sync(format!("listing refs in {}: {e}", self.path.display())))?;
        Ok(out.stdout)
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Fetch every configured remote
    pub async fn fetch_all(&self) -> Result<SyncOutcome> {
        let before = self.ref_snapshot("refs/remotes").await?;
        self.run_network(["fetch", "--all", "--prune"])
            .await
            .map_err(|e| Error::Sync(format!("fetch in {}: {e}", self.path.display())))?;
        let after = self.ref_snapshot("refs/remotes").await?;
        Ok(if before == after {
            SyncOutcome::UpToDate
        } else {
            SyncOutcome::Updated
        })
    }

    /// Fetch a single remote
    pub async fn fetch_remote(&self, remote: &str) -> Result<SyncOutcome> {
        let pattern = format!("refs/remotes/{remote}");
        let before = self.ref_snapshot(&pattern).await?;
        self.run_network(["fetch", "--prune", remote])
            .await
            .map_err(|e| {
                Error::Sync(format!("fetch {remote} in {}: {e}", self.path.display()))
            })?;
        let after = self.ref_snapshot(&pattern).await?;
        Ok(if before == after {
            SyncOutcome::UpToDate
        } else {
            SyncOutcome::Updated
        })
    }

    /// Discard uncommitted changes and any in-progress merge
    pub async fn hard_reset(&self) -> Result<()> {
        self.run_local(["reset", "--hard", "--quiet"])
            .await
            .map_err(|e| Error::Checkout(format!("reset in {}: {e}", self.path.display())))?;
        Ok(())
    }

    /// Switch the working tree to a local branch, discarding local changes
    pub async fn force_checkout(&self, branch: &str) -> Result<()> {
        self.run_local(["checkout", "--force", "--quiet", branch])
            .await
            .map_err(|e| Error::Checkout(format!("{branch} in {}: {e}", self.path.display())))?;
        Ok(())
    }

    /// Point `branch` at `refs/remotes/<remote>/<branch>` and switch to it,
    /// discarding local changes
    ///
    /// The start point is spelled out so a branch of the same name on another
    /// remote cannot make the checkout ambiguous.
    pub async fn force_checkout_tracking(&self, branch: &str, remote: &str) -> Result<()> {
        let upstream = format!("refs/remotes/{remote}/{branch}");
        self.run_local([
            "checkout",
            "--force",
            "--quiet",
            "-B",
            branch,
            "--track",
            upstream.as_str(),
        ])
        .await
        .map_err(|e| {
            Error::Checkout(format!(
                "{branch} from {upstream} in {}: {e}",
                self.path.display()
            ))
        })?;
        Ok(())
    }

    /// Switch the working tree to a local branch
    pub async fn checkout(&self, branch: &str) -> Result<()> {
        self.run_local(["checkout", "--quiet", branch])
            .await
            .map_err(|e| Error::Checkout(format!("{branch} in {}: {e}", self.path.display())))?;
        Ok(())
    }

    /// Fast-forward the current branch to its upstream
    pub async fn pull_ff_only(&self) -> Result<SyncOutcome> {
        let before = self.head().await?;
        self.run_network(["pull", "--ff-only", "--quiet"])
            .await
            .map_err(|e| Error::Sync(format!("pull in {}: {e}", self.path.display())))?;
        let after = self.head().await?;
        Ok(if before == after {
            SyncOutcome::UpToDate
        } else {
            SyncOutcome::Updated
        })
    }

    /// Write `refs/heads/<name>` at `target`, refusing to overwrite
    pub async fn create_ref(&self, name: &str, target: &gix::oid) -> Result<()> {
        let full = format!("refs/heads/{name}");
        let target = target.to_string();
        // An empty old-value makes update-ref fail if the ref already exists
        self.run_local(["update-ref", full.as_str(), target.as_str(), ""])
            .await
            .map_err(|e| match e {
                GitFailure::Exit { ref stderr, .. } if stderr.contains("already exists") => {
                    Error::BranchAlreadyExists(name.to_string())
                }
                other => Error::BranchCreate(format!("{full}: {other}")),
            })?;
        Ok(())
    }

    /// Set a repository-local config value
    pub async fn set_config(&self, key: &str, value: &str) -> Result<()> {
        self.run_local(["config", key, value])
            .await
            .map_err(|e| Error::BranchCreate(format!("config {key}: {e}")))?;
        Ok(())
    }

    /// Add a remote
    pub async fn add_remote(&self, name: &str, url: &str) -> Result<()> {
        self.run_local(["remote", "add", name, url])
            .await
            .map_err(|e| Error::RemoteCreate(format!("{name} -> {url}: {e}")))?;
        Ok(())
    }

    /// Merge `rev` (e.g. `parent_origin/master`) into the current branch
    pub async fn merge(&self, rev: &str) -> Result<MergeOutcome> {
        let before = self.head().await?;
        let peeled = format!("{rev}^{{commit}}");
        let theirs = self
            .run_local(["rev-parse", "--verify", "--quiet", peeled.as_str()])
            .await
            .map_err(|e| Error::Merge(format!("cannot resolve {rev}: {e}")))?
            .stdout
            .trim()
            .to_string();

        let message = format!("Merge {rev} into {}", self.current_branch().await?);
        let identity = self.merge_identity().await;
        let result = self
            .git(["merge", "--no-edit", "-m", message.as_str(), rev])
            .identity(identity.as_ref())
            .run()
            .await;

        if let Err(failure) = result {
            let files = self.unmerged_paths().await?;
            if !files.is_empty() || failure.stdout().contains("CONFLICT") {
                return Err(Error::MergeConflict {
                    branch: rev.to_string(),
                    files,
                });
            }
            return Err(Error::Merge(format!(
                "{rev} in {}: {failure}",
                self.path.display()
            )));
        }

        let after = self.head().await?;
        Ok(if after == before {
            MergeOutcome::AlreadyUpToDate
        } else if after == theirs {
            MergeOutcome::FastForward
        } else {
            MergeOutcome::Merged { commit: after }
        })
    }

    /// Identity for merge commits
    ///
    /// The configured identity wins. Without one, git's own `user.email` is
    /// used when set, otherwise [`CommitIdentity::fallback`].
    async fn merge_identity(&self) -> Option<CommitIdentity> {
        if let Some(identity) = &self.settings.identity {
            return Some(identity.clone());
        }
        if self.run_local(["config", "--get", "user.email"]).await.is_ok() {
            return None;
        }
        debug!(path = %self.path.display(), "no git identity configured, using fallback");
        Some(CommitIdentity::fallback())
    }

    async fn current_branch(&self) -> Result<String> {
        let out = self
            .run_local(["symbolic-ref", "--short", "HEAD"])
            .await
            .map_err(|e| Error::RefResolution(format!("HEAD in {}: {e}", self.path.display())))?;
        Ok(out.stdout.trim().to_string())
    }

    async fn unmerged_paths(&self) -> Result<Vec<String>> {
        let out = self
            .run_local(["diff", "--name-only", "--diff-filter=U"])
            .await
            .map_err(|e| Error::Merge(format!("listing conflicts: {e}")))?;
        Ok(out.stdout.lines().map(ToString::to_string).collect())
    }

    /// Push a refspec to a remote
    pub async fn push(&self, remote: &str, refspec: &str) -> Result<()> {
        info!(remote, refspec, path = %self.path.display(), "pushing");
        self.run_network(["push", "--porcelain", remote, refspec])
            .await
            .map_err(|e| Error::Push(format!("{refspec} to {remote}: {e}")))?;
        Ok(())
    }
}
