//! Progress reporting for automerge runs

use crate::error::Step;
use async_trait::async_trait;

/// Receives status updates while a run executes
#[async_trait]
pub trait ProgressCallback: Send + Sync {
    /// A step is about to start
    async fn on_step(&self, step: Step);

    /// Informational message (e.g. the generated branch name)
    async fn on_message(&self, message: &str);
}

/// Progress callback that ignores everything
pub struct NoopProgress;

#[async_trait]
impl ProgressCallback for NoopProgress {
    async fn on_step(&self, _step: Step) {}

    async fn on_message(&self, _message: &str) {}
}
