//! Mock hosting service for testing

#![allow(dead_code)]

use async_trait::async_trait;
use forksync::error::{Error, Result};
use forksync::platform::HostingService;
use std::sync::Mutex;

/// Call record for `trigger_merge_on_green`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerCall {
    pub repo_url: String,
    pub source_branch: String,
    pub target_branch: String,
}

/// Hosting service that records every request
///
/// Features:
/// - Call tracking for verification
/// - Error injection for failure path testing
#[derive(Default)]
pub struct MockHostingService {
    trigger_calls: Mutex<Vec<TriggerCall>>,
    error_on_trigger: Mutex<Option<String>>,
}

impl MockHostingService {
    /// Create a mock that accepts every request
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `trigger_merge_on_green` return an error
    pub fn fail_trigger(&self, msg: &str) {
        *self.error_on_trigger.lock().unwrap() = Some(msg.to_string());
    }

    /// Recorded `trigger_merge_on_green` calls
    pub fn trigger_calls(&self) -> Vec<TriggerCall> {
        self.trigger_calls.lock().unwrap().clone()
    }

    /// Assert exactly one request was made with these arguments
    pub fn assert_triggered_once(&self, repo_url: &str, source_branch: &str, target_branch: &str) {
        let calls = self.trigger_calls();
        assert_eq!(
            calls,
            vec![TriggerCall {
                repo_url: repo_url.to_string(),
                source_branch: source_branch.to_string(),
                target_branch: target_branch.to_string(),
            }]
        );
    }
}

#[async_trait]
impl HostingService for MockHostingService {
    async fn trigger_merge_on_green(
        &self,
        repo_url: &str,
        source_branch: &str,
        target_branch: &str,
    ) -> Result<()> {
        self.trigger_calls.lock().unwrap().push(TriggerCall {
            repo_url: repo_url.to_string(),
            source_branch: source_branch.to_string(),
            target_branch: target_branch.to_string(),
        });

        if let Some(msg) = self.error_on_trigger.lock().unwrap().clone() {
            return Err(Error::Hosting(msg));
        }
        Ok(())
    }
}
