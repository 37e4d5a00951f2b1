//! AMM configuration loading
//!
//! Layers, lowest first: built-in defaults, an optional TOML file, then
//! environment variables such as `TENOR_POOL__FEE=250`.

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tenor_types::FeeParams;
use tracing::{debug, info};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Top-level configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct AmmConfig {
    pub pool: PoolSettings,
    pub quote: QuoteSettings,
}

/// Fee constants applied to newly created pools, both over `2^16`
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct PoolSettings {
    pub fee: u16,
    pub protocol_fee: u16,
}

/// Quote service settings
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct QuoteSettings {
    pub log_level: String,
    pub json_logs: bool,
}

impl Default for PoolSettings {
    fn default() -> Self {
        // 100 / 65536 is about 0.15%, protocol keeps about 10% of it
        Self {
            fee: 100,
            protocol_fee: 6554,
        }
    }
}

impl Default for QuoteSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl AmmConfig {
    /// Load defaults, then `path` if given, then `TENOR_*` environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// Like `load`, reading overrides from `env` instead of the process environment
    pub fn load_with_env(path: Option<&Path>, env: Option<HashMap<String, String>>) -> Result<Self> {
        let mut builder = Config::builder().add_source(Self::defaults()?);

        if let Some(path) = path {
            info!("Loading AMM config: {:?}", path);
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("TENOR")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let config: Self = builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        config.validate()?;
        debug!(?config, "configuration loaded");
        Ok(config)
    }

    /// Parse an embedded TOML document over the defaults
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = Config::builder()
            .add_source(Self::defaults()?)
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()
            .context("Failed to parse TOML configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Render as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }

    pub fn fee_params(&self) -> FeeParams {
        FeeParams::new(self.pool.fee, self.pool.protocol_fee)
    }

    pub fn validate(&self) -> Result<()> {
        let level = self.quote.log_level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            bail!(
                "Invalid log level {:?}, expected one of {:?}",
                self.quote.log_level,
                LOG_LEVELS
            );
        }
        Ok(())
    }

    fn defaults() -> Result<Config> {
        Config::try_from(&Self::default()).context("Failed to encode default configuration")
    }
}

/// Convenience loader used by binaries
pub fn load_config(path: Option<&Path>) -> Result<AmmConfig> {
    AmmConfig::load(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = AmmConfig::default();
        assert_eq!(config.fee_params(), FeeParams::new(100, 6554));
        assert_eq!(config.quote.log_level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("tenor.toml");

        let config_content = r#"
[pool]
fee = 300
protocol_fee = 0

[quote]
log_level = "debug"
"#;
        fs::write(&config_path, config_content).unwrap();

        let config = AmmConfig::load_with_env(Some(&config_path), Some(HashMap::new())).unwrap();
        assert_eq!(config.fee_params(), FeeParams::new(300, 0));
        assert_eq!(config.quote.log_level, "debug");
        assert!(!config.quote.json_logs);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(AmmConfig::load_with_env(Some(&missing), Some(HashMap::new())).is_err());
    }

    #[test]
    fn test_environment_override() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("tenor.toml");
        fs::write(&config_path, "[pool]\nfee = 300\n").unwrap();

        let env = HashMap::from([
            ("TENOR_POOL__FEE".to_string(), "250".to_string()),
            ("TENOR_QUOTE__JSON_LOGS".to_string(), "true".to_string()),
        ]);
        let config = AmmConfig::load_with_env(Some(&config_path), Some(env)).unwrap();
        assert_eq!(config.pool.fee, 250);
        assert_eq!(config.pool.protocol_fee, 6554);
        assert!(config.quote.json_logs);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AmmConfig::from_toml_str("[quote]\nlog_level = \"warn\"\n").unwrap();
        assert_eq!(config.pool, PoolSettings::default());
        assert_eq!(config.quote.log_level, "warn");
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(AmmConfig::from_toml_str("[quote]\nlog_level = \"loud\"\n").is_err());
        // fee is a u16
        assert!(AmmConfig::from_toml_str("[pool]\nfee = 70000\n").is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = AmmConfig::default();
        let rendered = config.to_toml_string().unwrap();
        assert_eq!(AmmConfig::from_toml_str(&rendered).unwrap(), config);
    }
}
