//! Runtime configuration: parsing, defaults, and environment overrides.
//!
//! The TOML file is optional and every field has a default, so the tool runs
//! with no config at all. Precedence, lowest to highest:
//! file values, then `DATABASE_URL` from the environment, then CLI flags
//! (applied by the binary).
//!
//! ```toml
//! [database]
//! url = "price_history.db"
//!
//! [source]
//! requests_per_minute = 60
//! max_retries = 3
//! base_delay_ms = 500
//! max_delay_ms = 30000
//! timeout_secs = 30
//!
//! [chart]
//! output_dir = "/tmp/price_history"
//! ```

use std::{
    num::NonZeroU32,
    path::{Path, PathBuf},
    time::Duration,
};

use nonzero_ext::nonzero;
use price_ingestor::providers::yahoo::YahooSettings;
use serde::{Deserialize, Serialize};
use shared_utils::env::get_env_var_opt;

use crate::errors::ConfigError;

/// Environment variable that overrides [`DatabaseCfg::url`].
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    pub database: DatabaseCfg,
    pub source: SourceCfg,
    pub chart: ChartCfg,
}

/// Where the cache lives.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct DatabaseCfg {
    /// SQLite file path, optionally prefixed with `sqlite:`.
    pub url: String,
}

impl Default for DatabaseCfg {
    fn default() -> Self {
        Self {
            url: "price_history.db".to_string(),
        }
    }
}

/// Price source throttling and retry settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct SourceCfg {
    pub requests_per_minute: NonZeroU32,
    pub max_retries: u32,
    pub base_delay_ms: u64,
    /// Cap on a single retry delay.
    pub max_delay_ms: u64,
    pub timeout_secs: u64,
}

impl Default for SourceCfg {
    fn default() -> Self {
        Self {
            requests_per_minute: nonzero!(60u32),
            max_retries: 3,
            base_delay_ms: 500,
            max_delay_ms: 30_000,
            timeout_secs: 30,
        }
    }
}

impl SourceCfg {
    pub fn yahoo_settings(&self) -> YahooSettings {
        YahooSettings {
            requests_per_minute: self.requests_per_minute,
            max_retries: self.max_retries,
            base_delay: Duration::from_millis(self.base_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            timeout: Duration::from_secs(self.timeout_secs),
            ..YahooSettings::default()
        }
    }
}

/// Chart output settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct ChartCfg {
    pub output_dir: PathBuf,
}

impl Default for ChartCfg {
    fn default() -> Self {
        Self {
            output_dir: std::env::temp_dir().join("price_history"),
        }
    }
}

/// Parse a config from a TOML string and validate it.
pub fn load_config_str(s: &str) -> Result<Config, ConfigError> {
    let cfg: Config = toml::from_str(s)?;
    validate(&cfg)?;
    Ok(cfg)
}

/// Parse a config file.
pub fn load_config_path(path: &Path) -> Result<Config, ConfigError> {
    let s = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    load_config_str(&s)
}

/// Load from `path` if given (defaults otherwise), then apply environment overrides.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut cfg = match path {
        Some(p) => load_config_path(p)?,
        None => Config::default(),
    };
    apply_env(&mut cfg);
    Ok(cfg)
}

/// Apply `DATABASE_URL` if it is set and not blank.
pub fn apply_env(cfg: &mut Config) {
    if let Some(url) = get_env_var_opt(DATABASE_URL_ENV) {
        cfg.database.url = url;
    }
}

fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.database.url.trim().is_empty() {
        return Err(ConfigError::Invalid("database.url must not be empty".into()));
    }
    if cfg.source.max_delay_ms < cfg.source.base_delay_ms {
        return Err(ConfigError::Invalid(
            "source.max_delay_ms must not be below source.base_delay_ms".into(),
        ));
    }
    if cfg.source.timeout_secs == 0 {
        return Err(ConfigError::Invalid("source.timeout_secs must be positive".into()));
    }
    Ok(())
}
