//! Runtime configuration.
//!
//! Sources, lowest priority first:
//!
//! 1. Built-in defaults
//! 2. A TOML file: the explicit config path, otherwise `simplefiles.toml`
//!    in the current directory when it exists
//! 3. `SIMPLEFILES_*` environment variables (a `.env` file is loaded first)
//! 4. Values set on the builder, normally from CLI flags

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// File looked up in the current directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "simplefiles.toml";

/// Prefix for environment overrides, e.g. `SIMPLEFILES_LOG_LEVEL`.
pub const ENV_PREFIX: &str = "SIMPLEFILES";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base for relative paths and the default create directory.
    pub working_dir: PathBuf,
    /// Also enforce the parameter key allow-list during checking.
    pub strict_parameter_keys: bool,
    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            working_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            strict_parameter_keys: false,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Load from the default sources with no overrides.
    pub fn load() -> Result<Self> {
        Self::builder().build()
    }

    /// Render as TOML, e.g. for `simplefiles config`.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }
}

/// Builder for [`Config`]; values set here win over every other source.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config_path: Option<PathBuf>,
    working_dir: Option<PathBuf>,
    strict_parameter_keys: Option<bool>,
    log_level: Option<String>,
}

impl ConfigBuilder {
    pub fn config_path(mut self, path: Option<PathBuf>) -> Self {
        self.config_path = path;
        self
    }

    pub fn working_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.working_dir = dir;
        self
    }

    pub fn strict_parameter_keys(mut self, strict: Option<bool>) -> Self {
        self.strict_parameter_keys = strict;
        self
    }

    pub fn log_level(mut self, level: Option<String>) -> Self {
        self.log_level = level;
        self
    }

    pub fn build(self) -> Result<Config> {
        // missing .env is fine
        let _ = dotenvy::dotenv();

        let defaults = Config::default();
        let mut builder = ::config::Config::builder()
            .set_default(
                "working_dir",
                defaults.working_dir.to_string_lossy().into_owned(),
            )?
            .set_default("strict_parameter_keys", defaults.strict_parameter_keys)?
            .set_default("log_level", defaults.log_level.clone())?;

        builder = match &self.config_path {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("Config file not found: {}", path.display());
                }
                builder.add_source(::config::File::from(path.as_path()).required(true))
            }
            None => builder.add_source(
                ::config::File::from(Path::new(DEFAULT_CONFIG_FILE)).required(false),
            ),
        };

        builder = builder.add_source(::config::Environment::with_prefix(ENV_PREFIX));

        let mut config: Config = builder
            .build()
            .context("Failed to load configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;

        if let Some(dir) = self.working_dir {
            config.working_dir = dir;
        }
        if let Some(strict) = self.strict_parameter_keys {
            config.strict_parameter_keys = strict;
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }

        if config.working_dir.is_relative() {
            let cwd = std::env::current_dir().context("Failed to read current directory")?;
            config.working_dir = cwd.join(&config.working_dir);
        }

        Ok(config)
    }
}
