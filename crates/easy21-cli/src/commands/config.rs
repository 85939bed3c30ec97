//! Configuration management commands

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Subcommand;

use easy21_cli::config::CONFIG_FILE_NAME;
use easy21_cli::Config;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Initialize configuration file
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

pub fn run(cmd: ConfigCommands, config: &Config, source: Option<&Path>) -> Result<()> {
    match cmd {
        ConfigCommands::Show => show(config, source),
        ConfigCommands::Init { force } => init(source, force),
    }
}

fn show(config: &Config, source: Option<&Path>) -> Result<()> {
    println!("Current Configuration");
    println!("=====================\n");

    match source {
        Some(path) => println!("Config file: {}", path.display()),
        None => println!("No configuration file found. Using defaults."),
    }
    println!("Environment overrides: EASY21__<SECTION>__<KEY>\n");
    println!("{}", config.to_toml()?);

    Ok(())
}

/// Write the default configuration to `source`, or `./easy21.toml`
pub fn init(source: Option<&Path>, force: bool) -> Result<()> {
    let path = source.map_or_else(|| PathBuf::from(CONFIG_FILE_NAME), Path::to_path_buf);

    if Config::write_default(&path, force)? {
        println!("Configuration file created: {}", path.display());
    } else {
        println!("Configuration file already exists: {}", path.display());
        println!("Use --force to overwrite");
    }

    Ok(())
}
