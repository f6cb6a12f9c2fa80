//! forksync - keep a fork in sync with its upstream
//!
//! Each run clones (or refreshes) the fork and its upstream, merges the
//! upstream branch into a new timestamp-named branch on the fork, pushes it,
//! and asks GitHub or GitLab to merge it once its checks pass.
//!
//! The entry point is [`automerge::run_automerge`].

pub mod auth;
pub mod automerge;
pub mod config;
pub mod error;
pub mod git;
pub mod platform;
pub mod types;

pub use error::{Error, Result, Step};
