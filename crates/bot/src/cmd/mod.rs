//! CLI command implementations

pub mod config;
pub mod replay;

use anyhow::{Context, Result};
use rt_core::{AggregatorConfig, BotConfig};
use std::path::Path;

/// Aggregator settings: file (if any), then `SETTLE_DELAY_MS`
pub fn load_aggregator_config(path: Option<&Path>) -> Result<AggregatorConfig> {
    let mut config = AggregatorConfig::load(path).context("failed to load aggregator config")?;
    config
        .apply_env(|name| std::env::var(name).ok())
        .context("invalid aggregator environment override")?;
    Ok(config)
}

pub fn load_bot_config() -> Result<BotConfig> {
    BotConfig::from_env(|name| std::env::var(name).ok()).context("failed to read bot environment")
}
