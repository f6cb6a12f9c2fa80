//! Core types for forksync

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// A repository URL and the local path it is (or will be) cloned to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    /// Remote URL
    pub url: String,
    /// Local clone path
    pub path: PathBuf,
}

/// What `ensure_remote` found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteStatus {
    /// The remote was added
    Created,
    /// A remote with that name was already configured (URL not checked)
    Existing,
}

/// Result of a fetch or pull that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// New commits or refs arrived
    Updated,
    /// Nothing new
    UpToDate,
}

/// Result of merging the parent branch into the integration branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The parent branch was already contained in the integration branch
    AlreadyUpToDate,
    /// The integration branch was fast-forwarded to the parent tip
    FastForward,
    /// A merge commit was created
    Merged {
        /// Merge commit id (hex)
        commit: String,
    },
}

impl MergeOutcome {
    /// Whether the merge introduced any new commits
    pub const fn changed(&self) -> bool {
        !matches!(self, Self::AlreadyUpToDate)
    }
}

impl std::fmt::Display for MergeOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyUpToDate => write!(f, "already up to date"),
            Self::FastForward => write!(f, "fast-forward"),
            Self::Merged { commit } => write!(f, "merge commit {}", short_id(commit)),
        }
    }
}

fn short_id(id: &str) -> &str {
    id.get(..12).unwrap_or(id)
}

/// How the default integration branch of a clone is chosen
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DefaultBranch {
    /// Follow the remote's `HEAD` symbolic ref
    #[default]
    Auto,
    /// Always use this branch
    Named(String),
}

impl From<String> for DefaultBranch {
    fn from(value: String) -> Self {
        if value.is_empty() || value.eq_ignore_ascii_case("auto") {
            Self::Auto
        } else {
            Self::Named(value)
        }
    }
}

impl From<DefaultBranch> for String {
    fn from(value: DefaultBranch) -> Self {
        match value {
            DefaultBranch::Auto => "auto".to_string(),
            DefaultBranch::Named(name) => name,
        }
    }
}

impl FromStr for DefaultBranch {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_string()))
    }
}

/// Name and email used for merge commits
///
/// When unset, git's own configuration decides, and
/// [`CommitIdentity::fallback`] fills in if git has none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitIdentity {
    /// Committer name
    pub name: String,
    /// Committer email
    pub email: String,
}

impl CommitIdentity {
    /// Identity used when neither the config nor git provides one
    pub fn fallback() -> Self {
        Self {
            name: "forksync".to_string(),
            email: "forksync@localhost".to_string(),
        }
    }
}

/// Hosting backend selected for merge-on-green requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostingProvider {
    /// GitHub pull requests with auto-merge
    #[default]
    GitHub,
    /// GitLab merge requests with merge-when-pipeline-succeeds
    GitLab,
    /// Accept every request without contacting anything
    None,
}

impl FromStr for HostingProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "github" => Ok(Self::GitHub),
            "gitlab" => Ok(Self::GitLab),
            "none" | "noop" => Ok(Self::None),
            other => Err(format!(
                "unknown hosting provider '{other}' (expected github, gitlab or none)"
            )),
        }
    }
}

impl std::fmt::Display for HostingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GitHub => write!(f, "github"),
            Self::GitLab => write!(f, "gitlab"),
            Self::None => write!(f, "none"),
        }
    }
}

/// Detected platform type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    /// GitHub or GitHub Enterprise
    GitHub,
    /// GitLab or self-hosted GitLab
    GitLab,
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GitHub => write!(f, "GitHub"),
            Self::GitLab => write!(f, "GitLab"),
        }
    }
}

/// Platform configuration for one hosted repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformConfig {
    /// Platform type
    pub platform: Platform,
    /// Repository owner (user, organization or GitLab group path)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Custom host (None for github.com/gitlab.com)
    pub host: Option<String>,
}

/// A pull request / merge request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    /// PR/MR number
    pub number: u64,
    /// Web URL for the PR/MR
    pub html_url: String,
    /// Base branch name
    pub base_ref: String,
    /// Head branch name
    pub head_ref: String,
    /// PR/MR title
    pub title: String,
    /// GraphQL node ID (GitHub only, used for mutations)
    pub node_id: Option<String>,
}
