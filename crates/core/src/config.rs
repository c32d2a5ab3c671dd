//! Configuration for the bot and the media-group aggregator
//!
//! Two sources feed the runtime:
//! 1. Environment variables (bot identity, web-app location, receiver chat)
//! 2. An optional TOML file (aggregator tuning), overridable from the environment

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default quiet window before an album is considered complete
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 500;

/// Smallest accepted settle delay
pub const MIN_SETTLE_DELAY_MS: u64 = 10;

/// Largest accepted settle delay (one minute)
pub const MAX_SETTLE_DELAY_MS: u64 = 60_000;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable absent or empty
    #[error("required {0} was not provided")]
    Missing(&'static str),

    /// Environment variable present but unparsable
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },

    /// Value outside the accepted range
    #[error("{name} must be within {min}..={max}, got {value}")]
    OutOfRange {
        name: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },

    /// Config file could not be read
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Bot identity and relay targets, read from the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotConfig {
    /// Crate version reported by `/ping`
    pub version: String,
    /// Bot API token, also used as the web-app path secret
    pub token: String,
    /// Base URL of the embedded tagging form
    pub web_app_url: String,
    /// Chat that receives tagged media
    pub receiver_id: i64,
}

impl BotConfig {
    /// Build the config from an environment lookup
    ///
    /// The lookup is injected so tests can supply a fixed environment.
    /// Empty values are treated the same as missing ones.
    pub fn from_env<F>(getenv: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = required(&getenv, "TOKEN")?;
        let web_app_url = required(&getenv, "WEBAPP_URL")?;
        let receiver = required(&getenv, "RECEIVER_ID")?;
        let receiver_id = receiver
            .trim()
            .parse::<i64>()
            .map_err(|e| ConfigError::Invalid {
                name: "RECEIVER_ID",
                reason: e.to_string(),
            })?;

        Ok(Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            token,
            web_app_url: web_app_url.trim_end_matches('/').to_string(),
            receiver_id,
        })
    }
}

fn required<F>(getenv: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match getenv(name) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(name)),
    }
}

/// On-disk config file layout
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    aggregator: AggregatorConfig,
}

/// Media-group aggregator tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatorConfig {
    /// Quiet window (ms) after the newest album item before the album settles
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
}

fn default_settle_delay_ms() -> u64 {
    DEFAULT_SETTLE_DELAY_MS
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
        }
    }
}

impl AggregatorConfig {
    /// Load from an optional TOML file, falling back to defaults
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => {
                let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::from_toml_str(&contents)?
            }
            None => Self::default(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Parse the `[aggregator]` section out of a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(contents)?;
        Ok(file.aggregator)
    }

    /// Apply `SETTLE_DELAY_MS` from the environment, if set
    pub fn apply_env<F>(&mut self, getenv: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = getenv("SETTLE_DELAY_MS").filter(|v| !v.is_empty()) {
            self.settle_delay_ms = raw.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::Invalid {
                    name: "SETTLE_DELAY_MS",
                    reason: e.to_string(),
                }
            })?;
        }
        self.validate()
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_SETTLE_DELAY_MS..=MAX_SETTLE_DELAY_MS).contains(&self.settle_delay_ms) {
            return Err(ConfigError::OutOfRange {
                name: "settle_delay_ms",
                value: self.settle_delay_ms,
                min: MIN_SETTLE_DELAY_MS,
                max: MAX_SETTLE_DELAY_MS,
            });
        }
        Ok(())
    }

    /// Settle delay as a `Duration`
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

/// Example config file with every key documented
pub fn example_config() -> &'static str {
    r#"# Ratatoskr configuration

[aggregator]
# Quiet window after the newest album item before the album is relayed.
# Valid range: 10-60000 ms
settle_delay_ms = 500
"#
}
