//! Error types for forksync

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// The automerge step at which a run failed
///
/// Every failure of [`run_automerge`](crate::automerge::run_automerge) is
/// classified by the first step that errored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    /// Clone root allocation or path derivation
    Environment,
    /// Preparing the child (fork) repository
    ChildPrep,
    /// Preparing the parent (upstream) repository
    ParentPrep,
    /// Opening the prepared child repository
    RepositoryAccess,
    /// Registering the parent as a remote on the child
    RemoteSetup,
    /// Fetching the parent remote into the child
    Sync,
    /// Resolving the child's source branch tip
    RefResolution,
    /// Creating and checking out the integration branch
    BranchCreation,
    /// Merging the parent branch into the integration branch
    Merge,
    /// Pushing the integration branch to the child's origin
    Push,
    /// Asking the hosting provider to merge on green
    HostingRequest,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Environment => "environment setup",
            Self::ChildPrep => "child repository preparation",
            Self::ParentPrep => "parent repository preparation",
            Self::RepositoryAccess => "child repository access",
            Self::RemoteSetup => "parent remote setup",
            Self::Sync => "parent fetch",
            Self::RefResolution => "source branch resolution",
            Self::BranchCreation => "integration branch creation",
            Self::Merge => "merge",
            Self::Push => "push",
            Self::HostingRequest => "merge-on-green request",
        };
        f.write_str(label)
    }
}

/// Errors that can occur in forksync
#[derive(Error, Debug)]
pub enum Error {
    /// Temp dir allocation or other local environment problem
    #[error("environment error: {0}")]
    Environment(String),

    /// A repository URL that no local path can be derived from
    #[error("invalid repository URL: {0}")]
    InvalidUrl(String),

    /// Repository could not be cloned or opened
    #[error("cannot access repository at {}: {message}", path.display())]
    RepositoryAccess {
        /// Local path of the repository
        path: PathBuf,
        /// What went wrong
        message: String,
    },

    /// Fetch or pull failed
    #[error("sync failed: {0}")]
    Sync(String),

    /// Reference could not be resolved
    #[error("reference not found: {0}")]
    RefResolution(String),

    /// Refused to overwrite an existing branch
    #[error("branch '{0}' already exists")]
    BranchAlreadyExists(String),

    /// Branch creation failed for a reason other than existence
    #[error("failed to create branch: {0}")]
    BranchCreate(String),

    /// Working tree could not be switched
    #[error("checkout failed: {0}")]
    Checkout(String),

    /// Remotes could not be enumerated
    #[error("failed to list remotes: {0}")]
    RemoteList(String),

    /// Remote could not be added
    #[error("failed to create remote: {0}")]
    RemoteCreate(String),

    /// Merge stopped on conflicting changes
    #[error("merge of {branch} stopped on conflicts in: {}", files.join(", "))]
    MergeConflict {
        /// The branch being merged in
        branch: String,
        /// Paths left unmerged in the working tree
        files: Vec<String>,
    },

    /// Merge failed for a reason other than conflicts
    #[error("merge failed: {0}")]
    Merge(String),

    /// Push was rejected or failed
    #[error("push failed: {0}")]
    Push(String),

    /// GitHub API error
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// GitLab API error
    #[error("GitLab API error: {0}")]
    GitLabApi(String),

    /// Hosting request rejected by the provider (also used by test doubles)
    #[error("hosting request failed: {0}")]
    Hosting(String),

    /// Authentication error
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Configuration could not be read or parsed
    #[error("config error: {0}")]
    Config(String),

    /// URL does not look like a hosted repository
    #[error("no supported remote URL (expected a GitHub or GitLab repository)")]
    NoSupportedRemotes,

    /// Hosted repository on a platform we can't talk to
    #[error("unsupported platform for {0}")]
    UnsupportedPlatform(String),

    /// A failed automerge step, wrapping the underlying cause
    #[error("{step}: {source}")]
    Step {
        /// The step that failed
        step: Step,
        /// The underlying error
        #[source]
        source: Box<Error>,
    },

    /// Octocrab error
    #[error("GitHub API error: {0}")]
    Octocrab(#[from] octocrab::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Wrap this error with the automerge step it happened in
    #[must_use]
    pub fn at(self, step: Step) -> Self {
        Self::Step {
            step,
            source: Box::new(self),
        }
    }

    /// The failing automerge step, if this error came out of a run
    pub const fn step(&self) -> Option<Step> {
        match self {
            Self::Step { step, .. } => Some(*step),
            _ => None,
        }
    }

    /// The innermost non-step error
    pub fn root(&self) -> &Self {
        match self {
            Self::Step { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Attach an automerge step to a fallible result
pub(crate) trait StepContext<T> {
    fn at_step(self, step: Step) -> Result<T>;
}

impl<T> StepContext<T> for Result<T> {
    fn at_step(self, step: Step) -> Result<T> {
        self.map_err(|e| e.at(step))
    }
}
