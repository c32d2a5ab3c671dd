//! Recorded update replay
//!
//! Updates are stored one JSON object per line. Each line is an
//! [`IncomingMessage`] plus an optional `delay_ms` to wait before it is
//! dispatched. Blank lines and lines starting with `#` are skipped.

use crate::handlers::Handler;
use crate::transport::BotApi;
use crate::update::IncomingMessage;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{error, info, warn};

/// One recorded update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayEntry {
    /// Pause before dispatching this update
    #[serde(default)]
    pub delay_ms: u64,
    #[serde(flatten)]
    pub message: IncomingMessage,
}

/// Counts reported after a replay
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub dispatched: usize,
    pub failed: usize,
    /// Groups still buffered when the drain deadline passed
    pub pending_groups: usize,
}

pub fn parse_entries(input: &str) -> Result<Vec<ReplayEntry>> {
    let mut entries = Vec::new();
    for (idx, line) in input.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let entry = serde_json::from_str(line)
            .with_context(|| format!("invalid update on line {}", idx + 1))?;
        entries.push(entry);
    }
    Ok(entries)
}

pub fn load_entries(path: &Path) -> Result<Vec<ReplayEntry>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_entries(&contents)
}

/// Dispatch every entry in order, then wait for buffered albums to settle
///
/// A failing update is logged and counted; the replay carries on.
pub async fn run<B: BotApi + 'static>(
    handler: &Handler<B>,
    entries: Vec<ReplayEntry>,
) -> Result<ReplaySummary> {
    let mut summary = ReplaySummary::default();

    for entry in entries {
        if entry.delay_ms > 0 {
            sleep(Duration::from_millis(entry.delay_ms)).await;
        }
        summary.dispatched += 1;
        if let Err(e) = handler.dispatch(&entry.message).await {
            summary.failed += 1;
            error!("Update {} failed: {:#}", entry.message.message_id, e);
        }
    }

    summary.pending_groups = drain(handler).await;
    info!(
        "Replayed {} updates ({} failed)",
        summary.dispatched, summary.failed
    );
    Ok(summary)
}

/// Wait until no group is buffered, bounded by a few settle windows
async fn drain<B: BotApi + 'static>(handler: &Handler<B>) -> usize {
    let aggregator = handler.aggregator();
    let settle = aggregator.settle_delay();
    let deadline = Instant::now() + settle * 4;
    let poll = (settle / 4).max(Duration::from_millis(5));

    while aggregator.pending_groups() > 0 {
        if Instant::now() >= deadline {
            let pending = aggregator.pending_groups();
            warn!("{} groups still pending after replay", pending);
            return pending;
        }
        sleep(poll).await;
    }
    0
}
