//! Configuration loading for the Easy21 driver

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use config::{ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use easy21_core::Easy21Config;
use easy21_rl::{AgentConfig, Algorithm};

/// Prefix for environment overrides, e.g. `EASY21__TRAINING__SEED=7`
pub const ENV_PREFIX: &str = "EASY21";

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "EASY21_CONFIG";

/// File name searched in the working directory and the user config dir
pub const CONFIG_FILE_NAME: &str = "easy21.toml";

/// Configuration for the driver
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub environment: Easy21Config,
    pub agent: AgentConfig,
    pub training: TrainingConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub algorithm: Algorithm,
    pub num_iterations: u64,
    /// Environment seed; the policy stream uses `seed + 1`
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::MonteCarlo,
            num_iterations: 100_000,
            seed: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from `path` (if any) layered under `EASY21__*` variables
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    pub fn load_with_prefix(path: Option<&Path>, env_prefix: &str) -> Result<Self> {
        let mut builder = ConfigBuilder::<config::builder::DefaultState>::default();

        if let Some(path) = path {
            builder = builder.add_source(File::from(path.to_path_buf()).format(FileFormat::Toml));
        }

        builder = builder.add_source(
            Environment::with_prefix(env_prefix)
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = builder
            .build()?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Find the configuration file
    ///
    /// An explicit path always wins, even if missing, so that loading reports it.
    pub fn find_config_file(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }

        // Check in order: EASY21_CONFIG, ./easy21.toml, ~/.config/easy21/easy21.toml
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            return Some(local);
        }

        Self::user_config_path().filter(|path| path.exists())
    }

    /// `~/.config/easy21/easy21.toml`
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".config").join("easy21").join(CONFIG_FILE_NAME))
    }

    pub fn validate(&self) -> Result<()> {
        self.environment
            .validate()
            .context("Invalid [environment] section")?;
        self.agent.validate().context("Invalid [agent] section")?;

        if self.training.num_iterations == 0 {
            bail!("training.num_iterations must be at least 1");
        }
        if self.logging.level.parse::<tracing::Level>().is_err() {
            bail!(
                "logging.level must be one of trace, debug, info, warn, error (got {:?})",
                self.logging.level
            );
        }
        Ok(())
    }

    /// Seed for the policy's random stream
    pub fn policy_seed(&self) -> u64 {
        self.training.seed.wrapping_add(1)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }

    /// Write the default configuration to `path`.
    ///
    /// Returns `false` without touching the file if it exists and `force` is unset.
    pub fn write_default(path: &Path, force: bool) -> Result<bool> {
        if path.exists() && !force {
            return Ok(false);
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(path, Self::default().to_toml()?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(true)
    }
}
