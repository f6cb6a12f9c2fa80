//! GitHub token discovery

use super::{AuthSource, token_from_cli, token_from_env};
use crate::error::{Error, Result};
use tracing::debug;

/// Environment variables checked for a GitHub token, in order
const TOKEN_VARS: &[&str] = &["GITHUB_TOKEN", "GH_TOKEN"];

/// GitHub authentication configuration
#[derive(Debug, Clone)]
pub struct GitHubAuthConfig {
    /// Access token
    pub token: String,
    /// Where the token came from
    pub source: AuthSource,
    /// GitHub Enterprise host, if any
    pub host: Option<String>,
}

/// Find a GitHub token
///
/// Checks `GITHUB_TOKEN` and `GH_TOKEN`, then falls back to `gh auth token`.
pub async fn get_github_auth(host: Option<&str>) -> Result<GitHubAuthConfig> {
    if let Some(token) = token_from_env(TOKEN_VARS) {
        debug!("GitHub token from environment");
        return Ok(GitHubAuthConfig {
            token,
            source: AuthSource::EnvVar,
            host: host.map(ToString::to_string),
        });
    }

    let mut args = vec!["auth", "token"];
    if let Some(h) = host {
        args.extend(["--hostname", h]);
    }
    if let Some(token) = token_from_cli("gh", &args).await {
        debug!("GitHub token from gh CLI");
        return Ok(GitHubAuthConfig {
            token,
            source: AuthSource::Cli,
            host: host.map(ToString::to_string),
        });
    }

    Err(Error::Auth(
        "no GitHub token found: set GITHUB_TOKEN or run 'gh auth login'".to_string(),
    ))
}
