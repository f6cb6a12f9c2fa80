//! Config command - show the effective configuration

use crate::cli::style::Stylize;
use anstream::{print, println};
use anyhow::{Context, Result};
use forksync::config::{Config, default_config_path, load_config};
use std::path::{Path, PathBuf};

/// Resolve the config path: explicit flag first, then the user config dir
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    explicit.map(Path::to_path_buf).or_else(default_config_path)
}

/// Load the config at `path`, or defaults when there is no path
pub fn load(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => load_config(path)
            .with_context(|| format!("failed to load configuration from {}", path.display())),
        None => Ok(Config::default()),
    }
}

/// Run the config command
pub fn run_config(path: Option<&Path>) -> Result<()> {
    let config = load(path)?;

    match path {
        Some(path) if path.exists() => {
            println!("{} {}", "# Config file:".muted(), path.display());
        }
        Some(path) => {
            println!(
                "{} {} {}",
                "# Config file:".muted(),
                path.display(),
                "(not found, using defaults)".muted()
            );
        }
        None => println!("{}", "# No config directory, using defaults".muted()),
    }

    print!("{}", config.to_toml()?);
    Ok(())
}
