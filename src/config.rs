//! Configuration file `<config dir>/forksync/config.toml`.

use crate::automerge::{
    AutomergeOptions, CloneRoot, DEFAULT_BRANCH_PREFIX, DEFAULT_CLONE_PREFIX,
    DEFAULT_PARENT_REMOTE,
};
use crate::error::{Error, Result};
use crate::git::GitSettings;
use crate::platform::HostingOptions;
use crate::types::{CommitIdentity, DefaultBranch, HostingProvider};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Directory name for forksync within the user config directory.
const CONFIG_DIR: &str = "forksync";

/// Filename for the configuration.
const CONFIG_FILE: &str = "config.toml";

/// Host override for one hosting provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderHost {
    /// Custom host (None for the public instance)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

/// User configuration
///
/// Every field has a default, so an empty or missing file is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Hosting backend for merge-on-green requests
    pub provider: HostingProvider,
    /// Branch clones are reset to (`auto` follows the remote's HEAD)
    pub default_branch: DefaultBranch,
    /// Prefix for integration branch names
    pub branch_prefix: String,
    /// Fixed clone root reused across runs (None = fresh temp dir per run)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clone_root: Option<PathBuf>,
    /// Prefix for per-run temp clone roots
    pub clone_prefix: String,
    /// Remote name the parent is registered under on the child
    pub parent_remote: String,
    /// Timeout for clone/fetch/pull/push, in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_timeout_secs: Option<u64>,
    /// Identity for merge commits
    ///
    /// Unset falls back to git's `user.email`, then to `forksync <forksync@localhost>`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<CommitIdentity>,
    /// GitHub settings
    pub github: ProviderHost,
    /// GitLab settings
    pub gitlab: ProviderHost,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: HostingProvider::default(),
            default_branch: DefaultBranch::default(),
            branch_prefix: DEFAULT_BRANCH_PREFIX.to_string(),
            clone_root: None,
            clone_prefix: DEFAULT_CLONE_PREFIX.to_string(),
            parent_remote: DEFAULT_PARENT_REMOTE.to_string(),
            network_timeout_secs: None,
            identity: None,
            github: ProviderHost::default(),
            gitlab: ProviderHost::default(),
        }
    }
}

impl Config {
    /// Options for [`run_automerge`](crate::automerge::run_automerge)
    pub fn automerge_options(&self) -> AutomergeOptions {
        let clone_root = self.clone_root.as_ref().map_or_else(
            || CloneRoot::Temp {
                prefix: self.clone_prefix.clone(),
            },
            |path| CloneRoot::Fixed(path.clone()),
        );

        AutomergeOptions {
            clone_root,
            default_branch: self.default_branch.clone(),
            branch_prefix: self.branch_prefix.clone(),
            parent_remote: self.parent_remote.clone(),
            git: GitSettings {
                network_timeout: self.network_timeout_secs.map(Duration::from_secs),
                identity: self.identity.clone(),
            },
        }
    }

    /// Options for [`create_hosting_service`](crate::platform::create_hosting_service)
    pub fn hosting_options(&self) -> HostingOptions {
        HostingOptions {
            github_host: self.github.host.clone(),
            gitlab_host: self.gitlab.host.clone(),
        }
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {e}")))
    }
}

/// Default config file location, if the platform has a config directory.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}

/// Load configuration from disk.
///
/// Returns the default `Config` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_path() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("forksync/config.toml"));
        }
    }

    #[test]
    fn test_load_missing_file_returns_default() {
        let temp = TempDir::new().unwrap();
        let config = load_config(&temp.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.parent_remote, "parent_origin");
    }

    #[test]
    fn test_partial_file_merges_with_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            "provider = \"gitlab\"\ndefault_branch = \"main\"\nnetwork_timeout_secs = 90\n\n[gitlab]\nhost = \"git.corp\"\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.provider, HostingProvider::GitLab);
        assert_eq!(config.default_branch, DefaultBranch::Named("main".to_string()));
        assert_eq!(config.gitlab.host.as_deref(), Some("git.corp"));
        assert_eq!(config.branch_prefix, DEFAULT_BRANCH_PREFIX);

        let options = config.automerge_options();
        assert_eq!(options.git.network_timeout, Some(Duration::from_secs(90)));
        assert_eq!(
            options.clone_root,
            CloneRoot::Temp {
                prefix: DEFAULT_CLONE_PREFIX.to_string()
            }
        );
    }

    #[test]
    fn test_fixed_clone_root_and_identity() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            "clone_root = \"/var/tmp/forks\"\n\n[identity]\nname = \"Sync Bot\"\nemail = \"bot@example.com\"\n",
        )
        .unwrap();

        let options = load_config(&path).unwrap().automerge_options();
        assert_eq!(
            options.clone_root,
            CloneRoot::Fixed(PathBuf::from("/var/tmp/forks"))
        );
        assert_eq!(
            options.git.identity,
            Some(CommitIdentity {
                name: "Sync Bot".to_string(),
                email: "bot@example.com".to_string(),
            })
        );
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "provider = \"bitbucket\"\n").unwrap();

        assert!(matches!(load_config(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "defualt_branch = \"main\"\n").unwrap();

        assert!(matches!(load_config(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_roundtrip_through_toml() {
        let config = Config {
            provider: HostingProvider::None,
            default_branch: DefaultBranch::Named("trunk".to_string()),
            ..Config::default()
        };
        let rendered = config.to_toml().unwrap();
        assert!(rendered.contains("provider = \"none\""));
        assert!(rendered.contains("default_branch = \"trunk\""));

        let parsed: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }
}
