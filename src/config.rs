//! Configuration management
//!
//! Settings come from (lowest precedence first):
//! 1. optional TOML file, `[converter]` table
//! 2. environment (`POOL_ADDRESS`, `.env` supported)
//! 3. command-line flags
//!
//! Layers 2 and 3 are merged by clap before reaching `ConverterConfig::resolve`.

use crate::error::ConfigError;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Top-level TOML configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub converter: ConverterSection,
}

/// `[converter]` table
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConverterSection {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub pool_address: Option<String>,
    #[serde(default)]
    pub compact: bool,
}

impl FileConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;

        Ok(config)
    }
}

/// Values supplied on the command line or via environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub pool_address: Option<String>,
    pub compact: bool,
}

/// Fully resolved settings for one conversion run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Lower-cased pool contract address
    pub pool_address: String,
    pub pretty: bool,
}

impl ConverterConfig {
    /// Merge file settings with overrides. Fails before any I/O if a
    /// required value is missing.
    pub fn resolve(file: ConverterSection, overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        let pool_address = overrides
            .pool_address
            .or(file.pool_address)
            .as_deref()
            .and_then(normalize_pool_address)
            .ok_or(ConfigError::MissingPoolAddress)?;

        if !looks_like_address(&pool_address) {
            warn!("Pool address '{}' is not a 20-byte hex address", pool_address);
        }

        let input = overrides.input.or(file.input).ok_or(ConfigError::MissingInput)?;
        let output = overrides.output.or(file.output).ok_or(ConfigError::MissingOutput)?;

        Ok(Self {
            input,
            output,
            pool_address,
            pretty: !(overrides.compact || file.compact),
        })
    }
}

/// Trim and lower-case; blank input counts as absent
pub fn normalize_pool_address(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// `0x` followed by 40 hex digits
pub fn looks_like_address(address: &str) -> bool {
    address
        .strip_prefix("0x")
        .map(|hex| hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()))
        .unwrap_or(false)
}
