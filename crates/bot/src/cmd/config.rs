//! Configuration inspection command
//!
//! Shows, documents and validates the settings the bot starts with.

use super::{load_aggregator_config, load_bot_config};
use anyhow::Result;
use owo_colors::OwoColorize;
use rt_core::config::{MAX_SETTLE_DELAY_MS, MIN_SETTLE_DELAY_MS};
use std::path::Path;

/// Print effective configuration
pub fn run_show(config_path: Option<&Path>) -> Result<()> {
    let aggregator = load_aggregator_config(config_path)?;

    println!("{}", "Ratatoskr Configuration".bold());
    match config_path {
        Some(path) => println!("{}: {}\n", "Location".dimmed(), path.display().dimmed()),
        None => println!("{}: {}\n", "Location".dimmed(), "(defaults)".dimmed()),
    }

    println!("{}", "[aggregator]".yellow());
    println!(
        "  {} = {} {}",
        "settle_delay_ms".cyan(),
        aggregator.settle_delay_ms,
        format!("({:?})", aggregator.settle_delay()).dimmed()
    );

    println!("\n{}", "[environment]".yellow());
    match load_bot_config() {
        Ok(bot) => {
            println!("  {} = {}", "TOKEN".cyan(), mask_token(&bot.token));
            println!("  {} = {}", "WEBAPP_URL".cyan(), bot.web_app_url);
            println!("  {} = {}", "RECEIVER_ID".cyan(), bot.receiver_id);
        }
        Err(e) => println!("  {} {:#}", "✗".red(), e),
    }

    println!("\n{}", "Valid Ranges:".bold());
    println!(
        "  settle_delay_ms: {}-{}",
        MIN_SETTLE_DELAY_MS, MAX_SETTLE_DELAY_MS
    );

    Ok(())
}

/// Print a documented example config file
pub fn run_example() -> Result<()> {
    print!("{}", rt_core::example_config());
    Ok(())
}

/// Validate file, overrides and environment
pub fn run_check(config_path: Option<&Path>) -> Result<()> {
    load_aggregator_config(config_path)?;
    println!("{} aggregator settings", "✓".green());

    load_bot_config()?;
    println!("{} bot environment", "✓".green());

    println!("{}", "Configuration is valid".green().bold());
    Ok(())
}

/// Keep the bot id prefix, hide the secret part
fn mask_token(token: &str) -> String {
    match token.split_once(':') {
        Some((bot_id, secret)) if !secret.is_empty() => format!("{}:{}", bot_id, "*".repeat(8)),
        _ => "*".repeat(8),
    }
}
