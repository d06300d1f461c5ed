//! ifcheck configuration
//!
//! Output preferences and policy overrides.
//! Config file: --config PATH, ~/.config/ifcheck/config.toml or /etc/ifcheck/config.toml

use anyhow::{Context, Result};
use clap::ValueEnum;
use ifcheck_shared::policy::PolicyOverrides;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Color display mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Color when stdout is a terminal
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    pub fn enabled(&self) -> bool {
        match self {
            ColorMode::Auto => console::colors_enabled(),
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

/// Report format for `check`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Markdown,
    Json,
}

/// Output configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub color: ColorMode,

    /// Default report format; `--format` wins
    #[serde(default)]
    pub format: OutputFormat,
}

/// Main ifcheck configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IfcheckConfig {
    #[serde(default)]
    pub output: OutputConfig,

    /// Thresholds, disabled checks and custom checks
    #[serde(default)]
    pub policy: PolicyOverrides,
}

impl IfcheckConfig {
    /// ~/.config/ifcheck/config.toml
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("ifcheck").join("config.toml"))
    }

    /// /etc/ifcheck/config.toml
    pub fn system_config_path() -> PathBuf {
        PathBuf::from("/etc/ifcheck/config.toml")
    }

    /// Load configuration.
    ///
    /// Priority:
    /// 1. Explicit path (must exist)
    /// 2. User config (~/.config/ifcheck/config.toml)
    /// 3. System config (/etc/ifcheck/config.toml)
    /// 4. Defaults
    ///
    /// Returns the path the config came from, if any.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            return Ok((Self::from_file(path)?, Some(path.to_path_buf())));
        }

        let candidates = Self::user_config_path()
            .into_iter()
            .chain(std::iter::once(Self::system_config_path()));
        for path in candidates {
            if path.exists() {
                return Ok((Self::from_file(&path)?, Some(path)));
            }
        }

        debug!("no config file found, using defaults");
        Ok((Self::default(), None))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = Self::parse(&contents)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Parse and validate TOML.
    pub fn parse(contents: &str) -> Result<Self> {
        let config: IfcheckConfig = toml::from_str(contents).context("Failed to parse TOML")?;
        config.policy.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }
}
