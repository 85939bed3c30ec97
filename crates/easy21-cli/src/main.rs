//! Easy21 CLI - Command line interface for training tabular control agents

// Clippy pedantic allows - these are intentional design choices
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::cast_precision_loss)]

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use easy21_cli::Config;

mod commands;

use commands::{compare, config, train};

#[derive(Parser)]
#[command(name = "easy21")]
#[command(author, version, about = "Easy21 - tabular Monte Carlo and SARSA(lambda) control", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (defaults to EASY21_CONFIG, ./easy21.toml, ~/.config/easy21/easy21.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Train an agent and print the learned value function
    Train(train::TrainArgs),

    /// Compare SARSA(lambda) across lambdas against a Monte Carlo reference
    Compare(compare::CompareArgs),

    /// Configuration management
    #[command(subcommand)]
    Config(config::ConfigCommands),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = Config::find_config_file(cli.config.as_deref());

    // Init writes the file other commands would load, so it runs on defaults
    if let Commands::Config(config::ConfigCommands::Init { force }) = cli.command {
        init_tracing(cli.verbose, "info");
        return config::init(config_path.as_deref(), force);
    }

    let config = Config::load_from(config_path.as_deref())?;
    init_tracing(cli.verbose, &config.logging.level);

    match &config_path {
        Some(path) => tracing::debug!("Loaded config from: {:?}", path),
        None => tracing::debug!("No config file found, using defaults"),
    }

    match cli.command {
        Commands::Train(args) => train::run(args, config),
        Commands::Compare(args) => compare::run(args, config),
        Commands::Config(cmd) => config::run(cmd, &config, config_path.as_deref()),
    }
}

/// Initialize logging based on verbosity
fn init_tracing(verbose: bool, level: &str) {
    let level = if verbose { "debug" } else { level };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("easy21={level},easy21_cli={level},easy21_core={level},easy21_rl={level}")
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
