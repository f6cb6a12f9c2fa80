//! forksync CLI entry point

mod cli;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use cli::run::RunArgs;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Keep a fork in sync with its upstream
#[derive(Parser, Debug)]
#[command(name = "forksync", version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to <config dir>/forksync/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Merge the upstream branch into a new fork branch and request merge-on-green
    Run(RunArgs),
    /// Show the config file path and effective configuration
    Config,
}

fn setup_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let config_path = cli::config::resolve_config_path(cli.config.as_deref());

    match cli.command {
        Commands::Run(args) => {
            let config = cli::config::load(config_path.as_deref())?;
            cli::run::run_run(&args, config).await
        }
        Commands::Config => cli::config::run_config(config_path.as_deref()),
    }
}
