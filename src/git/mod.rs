//! Git operations used by the automerge workflow
//!
//! The git executable does the actual work (clone, fetch, merge, push);
//! this module sequences it and classifies failures.

mod branch;
mod command;
mod prepare;
mod remote;
mod repo;

pub use branch::{checkout_branch, create_and_checkout_branch, create_branch, get_branch_hash};
pub use command::{GitCommand, GitFailure, GitOutput, GitSettings};
pub use prepare::{ORIGIN, prepare_repository};
pub use remote::ensure_remote;
pub use repo::GitRepo;
