//! Command-line interface

pub mod config;
pub mod run;
pub mod style;

use async_trait::async_trait;
use forksync::Step;
use forksync::automerge::ProgressCallback;
use indicatif::ProgressBar;
use std::sync::Mutex;
use std::time::Duration;
use style::{Stylize, check, cross, spinner_style};

/// Progress callback that shows the current step on a spinner
///
/// Each finished step is printed above the spinner with a check mark.
pub struct CliProgress {
    spinner: ProgressBar,
    current: Mutex<Option<Step>>,
}

impl CliProgress {
    /// Start a spinner on stderr (hidden when stderr is not a terminal)
    pub fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(spinner_style());
        spinner.enable_steady_tick(Duration::from_millis(80));
        Self {
            spinner,
            current: Mutex::new(None),
        }
    }

    /// Mark the last step done and clear the spinner
    pub fn finish(&self) {
        if let Some(step) = self.take_current() {
            self.spinner.println(format!("{} {step}", check()));
        }
        self.spinner.finish_and_clear();
    }

    /// Mark the last step failed and clear the spinner
    pub fn fail(&self) {
        if let Some(step) = self.take_current() {
            self.spinner.println(format!("{} {step}", cross()));
        }
        self.spinner.finish_and_clear();
    }

    fn take_current(&self) -> Option<Step> {
        self.current.lock().ok().and_then(|mut current| current.take())
    }

    fn replace_current(&self, step: Step) -> Option<Step> {
        self.current
            .lock()
            .ok()
            .and_then(|mut current| current.replace(step))
    }
}

impl Default for CliProgress {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProgressCallback for CliProgress {
    async fn on_step(&self, step: Step) {
        if let Some(done) = self.replace_current(step) {
            self.spinner.println(format!("{} {done}", check()));
        }
        self.spinner.set_message(format!("{}...", step.emphasis()));
    }

    async fn on_message(&self, message: &str) {
        self.spinner.println(format!("  {}", message.muted()));
    }
}
