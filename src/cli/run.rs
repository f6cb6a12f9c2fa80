//! Run command - merge upstream into a new branch and request merge-on-green

use crate::cli::CliProgress;
use crate::cli::style::{CHECK, Stylize, arrow};
use anstream::println;
use anyhow::{Context, Result};
use clap::Args;
use forksync::automerge::{AutomergeReport, AutomergeRequest, run_automerge};
use forksync::config::Config;
use forksync::platform::create_hosting_service;
use forksync::types::{DefaultBranch, HostingProvider};
use std::path::PathBuf;

/// Arguments for `forksync run`
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// URL of the fork to update
    #[arg(long, value_name = "URL")]
    pub child: String,

    /// URL of the upstream repository
    #[arg(long, value_name = "URL")]
    pub parent: String,

    /// Fork branch to start from and merge back into
    #[arg(long, default_value = "master", value_name = "BRANCH")]
    pub child_branch: String,

    /// Upstream branch to merge
    #[arg(long, default_value = "master", value_name = "BRANCH")]
    pub parent_branch: String,

    /// Hosting provider for the merge-on-green request (github, gitlab, none)
    #[arg(long, value_name = "PROVIDER")]
    pub provider: Option<HostingProvider>,

    /// Reuse clones under this directory instead of a fresh temp dir
    #[arg(long, value_name = "DIR")]
    pub clone_root: Option<PathBuf>,

    /// Branch clones are reset to ("auto" follows the remote's HEAD)
    #[arg(long, value_name = "BRANCH")]
    pub default_branch: Option<DefaultBranch>,

    /// Prefix for the integration branch name
    #[arg(long, value_name = "PREFIX")]
    pub branch_prefix: Option<String>,

    /// Timeout for network git operations
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

impl RunArgs {
    /// Overlay command-line flags on the loaded configuration
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(provider) = self.provider {
            config.provider = provider;
        }
        if let Some(root) = &self.clone_root {
            config.clone_root = Some(root.clone());
        }
        if let Some(branch) = &self.default_branch {
            config.default_branch = branch.clone();
        }
        if let Some(prefix) = &self.branch_prefix {
            config.branch_prefix.clone_from(prefix);
        }
        if let Some(secs) = self.timeout {
            config.network_timeout_secs = Some(secs);
        }
        config
    }

    fn request(&self) -> AutomergeRequest {
        AutomergeRequest {
            child_url: self.child.clone(),
            parent_url: self.parent.clone(),
            child_branch: self.child_branch.clone(),
            parent_branch: self.parent_branch.clone(),
        }
    }
}

/// Run the run command
pub async fn run_run(args: &RunArgs, config: Config) -> Result<()> {
    let config = args.apply(config);
    let options = config.automerge_options();

    let hosting = create_hosting_service(config.provider, &config.hosting_options())
        .await
        .with_context(|| format!("failed to set up {} hosting", config.provider))?;

    println!(
        "{} {} {} {}",
        "Syncing".emphasis(),
        format!("{}/{}", args.parent, args.parent_branch).accent(),
        arrow(),
        format!("{}/{}", args.child, args.child_branch).accent()
    );

    let progress = CliProgress::new();
    let result = run_automerge(&args.request(), &options, hosting.as_ref(), &progress).await;

    match result {
        Ok(report) => {
            progress.finish();
            print_report(&report, config.provider);
            Ok(())
        }
        Err(e) => {
            progress.fail();
            Err(e).context("automerge failed")
        }
    }
}

fn print_report(report: &AutomergeReport, provider: HostingProvider) {
    let label = |name: &str| format!("{name:<8}").muted();

    println!();
    println!("  {} {}", label("Branch:"), report.branch.accent());
    println!("  {} {}", label("Merge:"), report.merge);
    println!("  {} {}", label("Clones:"), report.clone_root.display());
    println!();

    let message = match provider {
        HostingProvider::None => "Pushed integration branch (no hosting provider)".to_string(),
        _ => format!("Requested merge-on-green via {provider}"),
    };
    println!("{}", format!("{CHECK} {message}").success());
}
