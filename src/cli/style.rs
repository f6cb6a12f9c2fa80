//! Terminal styling helpers
//!
//! Colors are applied only when stdout supports them.

use indicatif::ProgressStyle;
use owo_colors::{OwoColorize, Stream};
use std::fmt::Display;

/// Check mark for completed steps
pub const CHECK: &str = "✓";

/// Cross for failed steps
pub const CROSS: &str = "✗";

/// Semantic styles for CLI output
pub trait Stylize {
    /// Headings and key values
    fn emphasis(&self) -> String;
    /// Branch names, counts and other highlighted data
    fn accent(&self) -> String;
    /// Secondary information
    fn muted(&self) -> String;
    /// Success messages
    fn success(&self) -> String;
    /// Error messages
    fn error(&self) -> String;
}

impl<T: Display> Stylize for T {
    fn emphasis(&self) -> String {
        self.if_supports_color(Stream::Stdout, |t| t.bold())
            .to_string()
    }

    fn accent(&self) -> String {
        self.if_supports_color(Stream::Stdout, |t| t.cyan())
            .to_string()
    }

    fn muted(&self) -> String {
        self.if_supports_color(Stream::Stdout, |t| t.dimmed())
            .to_string()
    }

    fn success(&self) -> String {
        self.if_supports_color(Stream::Stdout, |t| t.green())
            .to_string()
    }

    fn error(&self) -> String {
        self.if_supports_color(Stream::Stderr, |t| t.red())
            .to_string()
    }
}

/// Styled check mark
pub fn check() -> String {
    CHECK.success()
}

/// Styled cross
pub fn cross() -> String {
    CROSS.error()
}

/// Styled list arrow
pub fn arrow() -> String {
    "→".muted()
}

/// Spinner style used while a run is in progress
pub fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", " "])
}
