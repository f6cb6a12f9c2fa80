//! Runs the `git` executable
//!
//! Every invocation gets a non-interactive environment (no credential
//! prompts, C locale) and is killed if it outlives its timeout.

use crate::types::CommitIdentity;
use std::fmt;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Settings shared by every git invocation on a repository
#[derive(Debug, Clone, Default)]
pub struct GitSettings {
    /// Upper bound for network operations (clone, fetch, pull, push)
    pub network_timeout: Option<Duration>,
    /// Identity for commits git creates on our behalf (merges)
    pub identity: Option<CommitIdentity>,
}

/// Captured output of a successful git invocation
#[derive(Debug, Clone, Default)]
pub struct GitOutput {
    /// Standard output
    pub stdout: String,
    /// Standard error
    pub stderr: String,
}

/// Why a git invocation did not succeed
#[derive(Debug)]
pub enum GitFailure {
    /// The process could not be started
    Spawn(std::io::Error),
    /// git exited non-zero
    Exit {
        /// Exit code, if the process was not killed by a signal
        code: Option<i32>,
        /// Standard output
        stdout: String,
        /// Standard error
        stderr: String,
    },
    /// The timeout expired and the process was killed
    TimedOut(Duration),
}

impl GitFailure {
    /// Standard output of a failed run (empty unless git exited)
    pub fn stdout(&self) -> &str {
        match self {
            Self::Exit { stdout, .. } => stdout,
            _ => "",
        }
    }
}

impl fmt::Display for GitFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spawn(e) => write!(f, "could not run git: {e}"),
            Self::Exit {
                code,
                stdout,
                stderr,
            } => {
                let detail = if stderr.trim().is_empty() {
                    stdout.trim()
                } else {
                    stderr.trim()
                };
                match code {
                    Some(code) => write!(f, "git exited with status {code}: {detail}"),
                    None => write!(f, "git was terminated by a signal: {detail}"),
                }
            }
            Self::TimedOut(after) => write!(f, "git timed out after {}s", after.as_secs()),
        }
    }
}

/// A single git invocation
pub struct GitCommand<'a> {
    dir: &'a Path,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl<'a> GitCommand<'a> {
    /// Prepare `git <args>` to run in `dir`
    pub fn new<I, S>(dir: &'a Path, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            dir,
            args: args.into_iter().map(Into::into).collect(),
            timeout: None,
        }
    }

    /// Kill git if it has not finished after `timeout`
    #[must_use]
    pub const fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set committer/author identity for this invocation only
    #[must_use]
    pub fn identity(mut self, identity: Option<&CommitIdentity>) -> Self {
        if let Some(id) = identity {
            let mut args = vec![
                "-c".to_string(),
                format!("user.name={}", id.name),
                "-c".to_string(),
                format!("user.email={}", id.email),
            ];
            args.append(&mut self.args);
            self.args = args;
        }
        self
    }

    /// Run to completion
    pub async fn run(self) -> Result<GitOutput, GitFailure> {
        debug!(dir = %self.dir.display(), args = ?self.args, "running git");

        let child = Command::new("git")
            .args(&self.args)
            .current_dir(self.dir)
            .env("GIT_TERMINAL_PROMPT", "0")
            .env("LC_ALL", "C")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(GitFailure::Spawn)?;

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| GitFailure::TimedOut(limit))?,
            None => child.wait_with_output().await,
        }
        .map_err(GitFailure::Spawn)?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if output.status.success() {
            Ok(GitOutput { stdout, stderr })
        } else {
            debug!(code = ?output.status.code(), stderr = %stderr.trim(), "git failed");
            Err(GitFailure::Exit {
                code: output.status.code(),
                stdout,
                stderr,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_run_captures_stdout() {
        let temp = TempDir::new().unwrap();
        let out = GitCommand::new(temp.path(), ["--version"]).run().await.unwrap();
        assert!(out.stdout.starts_with("git version"));
    }

    #[tokio::test]
    async fn test_failure_carries_stderr() {
        let temp = TempDir::new().unwrap();
        let err = GitCommand::new(temp.path(), ["rev-parse", "HEAD"])
            .run()
            .await
            .unwrap_err();
        match err {
            GitFailure::Exit { code, stderr, .. } => {
                assert_ne!(code, Some(0));
                assert!(stderr.contains("not a git repository"));
            }
            other => panic!("expected exit failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_timeout_kills_hung_git() {
        let temp = TempDir::new().unwrap();
        let started = std::time::Instant::now();
        let err = GitCommand::new(
            temp.path(),
            [
                "-c",
                "core.sshCommand=sleep 30; true",
                "ls-remote",
                "ssh://git@forksync.invalid/me/fork.git",
            ],
        )
        .timeout(Some(Duration::from_secs(1)))
        .run()
        .await
        .unwrap_err();

        assert!(matches!(err, GitFailure::TimedOut(limit) if limit == Duration::from_secs(1)));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_identity_prefixes_config() {
        let dir = Path::new(".");
        let identity = CommitIdentity {
            name: "Bot".to_string(),
            email: "bot@example.com".to_string(),
        };
        let cmd = GitCommand::new(dir, ["merge", "x"]).identity(Some(&identity));
        assert_eq!(
            cmd.args,
            vec!["-c", "user.name=Bot", "-c", "user.email=bot@example.com", "merge", "x"]
        );
    }

    #[test]
    fn test_failure_display_prefers_stderr() {
        let failure = GitFailure::Exit {
            code: Some(1),
            stdout: "out".to_string(),
            stderr: "fatal: bad\n".to_string(),
        };
        assert_eq!(failure.to_string(), "git exited with status 1: fatal: bad");
        assert_eq!(
            GitFailure::TimedOut(Duration::from_secs(5)).to_string(),
            "git timed out after 5s"
        );
    }
}
