//! Platform detection from repository URLs

use crate::error::{Error, Result};
use crate::types::{Platform, PlatformConfig};
use regex::Regex;
use std::sync::LazyLock;

/// scp-like SSH syntax: `git@host:owner/repo.git`
static SCP_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[^@/]+@)?([^:/]+):(.+)$").expect("valid scp url regex")
});

/// Split a repository URL into host and path segments
///
/// Accepts `https://`, `ssh://`, `git://` and scp-like URLs. Trailing
/// slashes and an exact `.git` suffix are removed. Returns `(host, owner,
/// repo)` where `owner` may contain nested groups (`a/b/c`).
pub fn split_repo_url(url: &str) -> Option<(String, String, String)> {
    let trimmed = url.trim().trim_end_matches('/');

    let (host, path) = if trimmed.contains("://") {
        let parsed = url::Url::parse(trimmed).ok()?;
        let host = parsed.host_str()?.to_string();
        (host, parsed.path().trim_matches('/').to_string())
    } else {
        let caps = SCP_URL.captures(trimmed)?;
        (caps[1].to_string(), caps[2].trim_matches('/').to_string())
    };

    let path = path.strip_suffix(".git").unwrap_or(&path);
    let (owner, repo) = path.rsplit_once('/')?;
    if owner.is_empty() || repo.is_empty() {
        return None;
    }
    Some((host, owner.to_string(), repo.to_string()))
}

/// Detect the platform from a repository URL
///
/// `github.com` / `gitlab.com` and hosts containing `github` / `gitlab` are
/// recognised, as are the hosts named by `GH_HOST` and `GITLAB_HOST`.
pub fn detect_platform(url: &str) -> Option<Platform> {
    let (host, _, _) = split_repo_url(url)?;
    detect_host(&host, env_host("GH_HOST"), env_host("GITLAB_HOST"))
}

fn env_host(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|h| !h.is_empty())
}

fn detect_host(host: &str, gh_host: Option<String>, gitlab_host: Option<String>) -> Option<Platform> {
    let host = host.to_ascii_lowercase();
    if gh_host.is_some_and(|h| h.eq_ignore_ascii_case(&host)) || host.contains("github") {
        Some(Platform::GitHub)
    } else if gitlab_host.is_some_and(|h| h.eq_ignore_ascii_case(&host)) || host.contains("gitlab")
    {
        Some(Platform::GitLab)
    } else {
        None
    }
}

/// Parse a repository URL into a platform configuration
pub fn parse_repo_info(url: &str) -> Result<PlatformConfig> {
    let (host, owner, repo) = split_repo_url(url).ok_or(Error::NoSupportedRemotes)?;
    let platform = detect_platform(url).ok_or_else(|| Error::UnsupportedPlatform(url.to_string()))?;

    let host = match (platform, host.as_str()) {
        (Platform::GitHub, "github.com") | (Platform::GitLab, "gitlab.com") => None,
        _ => Some(host),
    };

    Ok(PlatformConfig {
        platform,
        owner,
        repo,
        host,
    })
}
