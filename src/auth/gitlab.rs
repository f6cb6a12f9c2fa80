//! GitLab token discovery

use super::{AuthSource, token_from_cli, token_from_env};
use crate::error::{Error, Result};
use tracing::debug;

/// Environment variables checked for a GitLab token, in order
const TOKEN_VARS: &[&str] = &["GITLAB_TOKEN", "GITLAB_PRIVATE_TOKEN"];

/// GitLab authentication configuration
#[derive(Debug, Clone)]
pub struct GitLabAuthConfig {
    /// Personal access token
    pub token: String,
    /// Where the token came from
    pub source: AuthSource,
    /// Self-hosted GitLab host, if any
    pub host: Option<String>,
}

/// Find a GitLab token
///
/// Checks `GITLAB_TOKEN` and `GITLAB_PRIVATE_TOKEN`, then falls back to
/// `glab config get token`.
pub async fn get_gitlab_auth(host: Option<&str>) -> Result<GitLabAuthConfig> {
    if let Some(token) = token_from_env(TOKEN_VARS) {
        debug!("GitLab token from environment");
        return Ok(GitLabAuthConfig {
            token,
            source: AuthSource::EnvVar,
            host: host.map(ToString::to_string),
        });
    }

    let mut args = vec!["config", "get", "token"];
    if let Some(h) = host {
        args.extend(["--host", h]);
    }
    if let Some(token) = token_from_cli("glab", &args).await {
        debug!("GitLab token from glab CLI");
        return Ok(GitLabAuthConfig {
            token,
            source: AuthSource::Cli,
            host: host.map(ToString::to_string),
        });
    }

    Err(Error::Auth(
        "no GitLab token found: set GITLAB_TOKEN or run 'glab auth login'".to_string(),
    ))
}
