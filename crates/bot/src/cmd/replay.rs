//! Replay command
//!
//! Feeds recorded updates through the real handlers against the dry-run
//! transport, so album settling can be observed in the logs.

use super::{load_aggregator_config, load_bot_config};
use aggregator::Aggregator;
use anyhow::{Context, Result};
use bot_lib::replay::{self, ReplayEntry};
use bot_lib::{DryRunBot, Handler};
use owo_colors::OwoColorize;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

pub async fn run(config_path: Option<&Path>, input: &str) -> Result<()> {
    let aggregator_config = load_aggregator_config(config_path)?;
    let bot_config = load_bot_config()?;

    let entries = read_input(input)?;
    println!(
        "{} {} updates (settle delay {}ms)",
        "Replaying".green().bold(),
        entries.len(),
        aggregator_config.settle_delay_ms
    );

    let handler = Handler::new(
        Arc::new(DryRunBot::default()),
        bot_config,
        Aggregator::from_config(&aggregator_config),
    );
    let summary = replay::run(&handler, entries).await?;

    println!("  {} {}", "dispatched:".dimmed(), summary.dispatched);
    if summary.failed > 0 {
        println!("  {} {}", "failed:".red(), summary.failed);
    }
    if summary.pending_groups > 0 {
        println!("  {} {}", "still pending:".yellow(), summary.pending_groups);
    }
    println!("{}", "✓ Replay complete".green());
    Ok(())
}

fn read_input(input: &str) -> Result<Vec<ReplayEntry>> {
    if input == "-" {
        let mut contents = String::new();
        std::io::stdin()
            .read_to_string(&mut contents)
            .context("failed to read updates from stdin")?;
        replay::parse_entries(&contents)
    } else {
        replay::load_entries(Path::new(input))
    }
}
