//! Automerge workflow
//!
//! Merges the latest upstream state into a fresh, timestamp-named branch on
//! the fork, pushes it, and asks the hosting provider to merge it once its
//! checks pass.

mod execute;
mod naming;
mod progress;

pub use execute::{
    AutomergeOptions, AutomergeReport, AutomergeRequest, CloneRoot, DEFAULT_CLONE_PREFIX,
    DEFAULT_PARENT_REMOTE, run_automerge,
};
pub use naming::{DEFAULT_BRANCH_PREFIX, clone_paths, integration_branch_name, repo_dir_name};
pub use progress::{NoopProgress, ProgressCallback};
