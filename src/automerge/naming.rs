//! Deterministic names for clone directories and integration branches

use crate::error::{Error, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use std::path::{Path, PathBuf};

/// Default prefix for integration branch names
pub const DEFAULT_BRANCH_PREFIX: &str = "forksync-automerge-";

/// Suffix added to the parent's directory when it would collide with the child's
const UPSTREAM_DIR_SUFFIX: &str = "-upstream";

/// Local directory name for a repository URL
///
/// The URL's final path segment with an exact trailing `.git` removed:
/// `https://host/org/repo.git` becomes `repo`, `https://host/org/test` stays
/// `test`.
pub fn repo_dir_name(url: &str) -> Result<String> {
    let trimmed = url.trim().trim_end_matches('/');
    let segment = trimmed
        .rsplit(['/', ':'])
        .next()
        .unwrap_or(trimmed);
    let name = segment.strip_suffix(".git").unwrap_or(segment);

    if name.is_empty() || name == "." || name == ".." {
        return Err(Error::InvalidUrl(url.to_string()));
    }
    Ok(name.to_string())
}

/// Clone paths for the child and parent repositories under `root`
///
/// Both live directly under `root`. When both URLs end in the same name the
/// parent's directory gets an `-upstream` suffix.
pub fn clone_paths(root: &Path, child_url: &str, parent_url: &str) -> Result<(PathBuf, PathBuf)> {
    let child = repo_dir_name(child_url)?;
    let mut parent = repo_dir_name(parent_url)?;
    if parent == child {
        parent.push_str(UPSTREAM_DIR_SUFFIX);
    }
    Ok((root.join(child), root.join(parent)))
}

/// Integration branch name for a run started at `at`
///
/// RFC 3339 with second precision; colons become `--` so the result is a
/// valid ref name and file name.
pub fn integration_branch_name(prefix: &str, at: DateTime<Utc>) -> String {
    let stamp = at.to_rfc3339_opts(SecondsFormat::Secs, true);
    format!("{prefix}{}", stamp.replace(':', "--"))
}
