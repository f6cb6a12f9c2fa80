//! Automerge execution - effectful operations
//!
//! Runs the automerge steps strictly in order and stops at the first
//! failure. Nothing is rolled back: clones, local branches and a pushed
//! integration branch stay on disk / on the remote for inspection.

use crate::automerge::naming::{DEFAULT_BRANCH_PREFIX, clone_paths, integration_branch_name};
use crate::automerge::progress::ProgressCallback;
use crate::error::{Error, Result, Step, StepContext};
use crate::git::{
    GitRepo, GitSettings, ORIGIN, create_and_checkout_branch, ensure_remote, get_branch_hash,
    prepare_repository,
};
use crate::platform::HostingService;
use crate::types::{DefaultBranch, MergeOutcome, RemoteStatus, RepoRef};
use chrono::Utc;
use std::path::PathBuf;
use tracing::{debug, info};

/// Remote name the parent repository is registered under on the child
pub const DEFAULT_PARENT_REMOTE: &str = "parent_origin";

/// Default prefix for per-run temporary clone roots
pub const DEFAULT_CLONE_PREFIX: &str = "forksync-";

/// The four inputs of a run
#[derive(Debug, Clone)]
pub struct AutomergeRequest {
    /// URL of the fork being kept in sync
    pub child_url: String,
    /// URL of the upstream repository
    pub parent_url: String,
    /// Fork branch the integration branch starts from and merges back into
    pub child_branch: String,
    /// Upstream branch merged into the integration branch
    pub parent_branch: String,
}

/// Where a run clones its repositories
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloneRoot {
    /// A fresh temporary directory per run, kept after the run
    Temp {
        /// Directory name prefix
        prefix: String,
    },
    /// A fixed directory, reused across runs
    Fixed(PathBuf),
}

impl Default for CloneRoot {
    fn default() -> Self {
        Self::Temp {
            prefix: DEFAULT_CLONE_PREFIX.to_string(),
        }
    }
}

/// Knobs for a run
#[derive(Debug, Clone)]
pub struct AutomergeOptions {
    /// Where clones live
    pub clone_root: CloneRoot,
    /// Branch both clones are reset to during preparation
    pub default_branch: DefaultBranch,
    /// Prefix for the integration branch name
    pub branch_prefix: String,
    /// Name of the parent remote on the child clone
    pub parent_remote: String,
    /// Timeout and identity for git invocations
    pub git: GitSettings,
}

impl Default for AutomergeOptions {
    fn default() -> Self {
        Self {
            clone_root: CloneRoot::default(),
            default_branch: DefaultBranch::Auto,
            branch_prefix: DEFAULT_BRANCH_PREFIX.to_string(),
            parent_remote: DEFAULT_PARENT_REMOTE.to_string(),
            git: GitSettings::default(),
        }
    }
}

/// Result of a successful run
#[derive(Debug, Clone)]
pub struct AutomergeReport {
    /// Integration branch created, pushed and handed to the host
    pub branch: String,
    /// Directory holding both clones
    pub clone_root: PathBuf,
    /// Child clone
    pub child: RepoRef,
    /// Parent clone
    pub parent: RepoRef,
    /// Whether the parent remote had to be added
    pub parent_remote: RemoteStatus,
    /// What the merge did
    pub merge: MergeOutcome,
}

/// Run the automerge workflow (EFFECTFUL)
///
/// Prepares both clones, wires the parent in as a remote on the child,
/// branches off the child's source branch, merges the parent branch, pushes
/// and asks the host to merge on green.
///
/// # Arguments
/// * `request` - Repositories and branches to sync
/// * `options` - Clone root, naming and git settings
/// * `hosting` - Hosting backend receiving the merge-on-green request
/// * `progress` - Progress callback for status updates
///
/// # Returns
/// An `AutomergeReport` on success, otherwise `Error::Step` naming the first
/// step that failed and wrapping its cause
pub async fn run_automerge(
    request: &AutomergeRequest,
    options: &AutomergeOptions,
    hosting: &dyn HostingService,
    progress: &dyn ProgressCallback,
) -> Result<AutomergeReport> {
    progress.on_step(Step::Environment).await;
    let clone_root = allocate_clone_root(&options.clone_root).at_step(Step::Environment)?;
    let (child_path, parent_path) =
        clone_paths(&clone_root, &request.child_url, &request.parent_url)
            .at_step(Step::Environment)?;
    debug!(
        clone_root = %clone_root.display(),
        child = %child_path.display(),
        parent = %parent_path.display(),
        "allocated clone paths"
    );

    progress.on_step(Step::ChildPrep).await;
    prepare_repository(
        &request.child_url,
        &child_path,
        &options.default_branch,
        &options.git,
    )
    .await
    .at_step(Step::ChildPrep)?;

    progress.on_step(Step::ParentPrep).await;
    prepare_repository(
        &request.parent_url,
        &parent_path,
        &options.default_branch,
        &options.git,
    )
    .await
    .at_step(Step::ParentPrep)?;

    progress.on_step(Step::RepositoryAccess).await;
    let child = GitRepo::open(&child_path, options.git.clone()).at_step(Step::RepositoryAccess)?;

    progress.on_step(Step::RemoteSetup).await;
    let parent_remote = ensure_remote(&child, &options.parent_remote, &request.parent_url)
        .await
        .at_step(Step::RemoteSetup)?;

    progress.on_step(Step::Sync).await;
    child
        .fetch_remote(&options.parent_remote)
        .await
        .at_step(Step::Sync)?;

    let branch = integration_branch_name(&options.branch_prefix, Utc::now());
    progress
        .on_message(&format!("Integration branch: {branch}"))
        .await;

    progress.on_step(Step::RefResolution).await;
    let source_ref = format!("refs/remotes/{ORIGIN}/{}", request.child_branch);
    let from = get_branch_hash(&child, &source_ref).at_step(Step::RefResolution)?;

    progress.on_step(Step::BranchCreation).await;
    create_and_checkout_branch(&child, &branch, &from)
        .await
        .at_step(Step::BranchCreation)?;

    progress.on_step(Step::Merge).await;
    let merge_rev = format!("{}/{}", options.parent_remote, request.parent_branch);
    let merge = child.merge(&merge_rev).await.at_step(Step::Merge)?;
    progress
        .on_message(&format!("Merged {merge_rev}: {merge}"))
        .await;

    progress.on_step(Step::Push).await;
    let refspec = format!("refs/heads/{branch}:refs/heads/{branch}");
    child.push(ORIGIN, &refspec).await.at_step(Step::Push)?;

    progress.on_step(Step::HostingRequest).await;
    hosting
        .trigger_merge_on_green(&request.child_url, &branch, &request.child_branch)
        .await
        .at_step(Step::HostingRequest)?;

    info!(branch, target = %request.child_branch, %merge, "automerge requested");

    Ok(AutomergeReport {
        branch,
        clone_root,
        child: RepoRef {
            url: request.child_url.clone(),
            path: child_path,
        },
        parent: RepoRef {
            url: request.parent_url.clone(),
            path: parent_path,
        },
        parent_remote,
        merge,
    })
}

fn allocate_clone_root(root: &CloneRoot) -> Result<PathBuf> {
    match root {
        CloneRoot::Temp { prefix } => tempfile::Builder::new()
            .prefix(prefix)
            .tempdir()
            .map(tempfile::TempDir::keep)
            .map_err(|e| Error::Environment(format!("failed to create temp dir: {e}"))),
        CloneRoot::Fixed(path) => {
            std::fs::create_dir_all(path).map_err(|e| {
                Error::Environment(format!("failed to create {}: {e}", path.display()))
            })?;
            Ok(path.clone())
        }
    }
}
