//! Per-group debouncing logic
//!
//! Every arrival spawns a deferred check that sleeps for the settle delay
//! and then re-reads the buffer. Only the check armed by the newest item of
//! a group fires the callback; earlier checks find a newer sequence and
//! exit. Nothing is ever cancelled, so there is no cancel/fire race.

use crate::buffer::{Item, KeyedOrderedBuffer};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

/// Result of one deferred check
#[derive(Debug)]
pub enum SettleOutcome {
    /// This check was the newest arrival and the callback succeeded
    Settled,
    /// A newer item arrived after this one; nothing was done
    Stale {
        /// Newest sequence seen at check time
        newest: i64,
    },
    /// The group was already consumed by an earlier settle
    Empty,
    /// The callback ran and returned an error
    CallbackFailed(anyhow::Error),
}

impl SettleOutcome {
    /// True if the callback ran (successfully or not)
    pub fn fired(&self) -> bool {
        matches!(self, SettleOutcome::Settled | SettleOutcome::CallbackFailed(_))
    }
}

/// Debounce trigger over a shared [`KeyedOrderedBuffer`]
pub struct DebounceTrigger<P> {
    buffer: Arc<KeyedOrderedBuffer<P>>,
    settle_delay: Duration,
}

impl<P> Clone for DebounceTrigger<P> {
    fn clone(&self) -> Self {
        Self {
            buffer: Arc::clone(&self.buffer),
            settle_delay: self.settle_delay,
        }
    }
}

impl<P> DebounceTrigger<P>
where
    P: Clone + Send + 'static,
{
    /// Create a trigger storing arrivals in `buffer`
    pub fn new(buffer: Arc<KeyedOrderedBuffer<P>>, settle_delay: Duration) -> Self {
        Self {
            buffer,
            settle_delay,
        }
    }

    /// Configured quiet window
    pub fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    /// Shared buffer the trigger writes into
    pub fn buffer(&self) -> &Arc<KeyedOrderedBuffer<P>> {
        &self.buffer
    }

    /// Record an arrival and arm a deferred check with the configured delay
    ///
    /// See [`DebounceTrigger::report_arrival_after`].
    pub fn report_arrival<F, Fut>(&self, item: Item<P>, on_settled: F) -> JoinHandle<SettleOutcome>
    where
        F: FnOnce(String) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.report_arrival_after(item, self.settle_delay, on_settled)
    }

    /// Record an arrival and arm a deferred check firing after `delay`
    ///
    /// The item is added to the buffer before this returns; the check and
    /// the callback run on a spawned task. Must be called from within a
    /// Tokio runtime.
    pub fn report_arrival_after<F, Fut>(
        &self,
        item: Item<P>,
        delay: Duration,
        on_settled: F,
    ) -> JoinHandle<SettleOutcome>
    where
        F: FnOnce(String) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let key = item.group_key.clone();
        let armed_for = item.sequence;

        if self.buffer.add(item) {
            debug!("Replaced redelivered item {} in group {}", armed_for, key);
        } else {
            debug!("Buffered item {} for group {}", armed_for, key);
        }

        let buffer = Arc::clone(&self.buffer);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            check_settled(&buffer, key, armed_for, on_settled).await
        })
    }
}

/// Deferred check body: fire only if `armed_for` is still the newest item
async fn check_settled<P, F, Fut>(
    buffer: &KeyedOrderedBuffer<P>,
    key: String,
    armed_for: i64,
    on_settled: F,
) -> SettleOutcome
where
    P: Clone,
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = anyhow::Result<()>>,
{
    // Lock is released before the callback runs
    let newest = buffer.newest_sequence(&key);

    match newest {
        None => {
            warn!("Group {} is empty at settle check (item {})", key, armed_for);
            SettleOutcome::Empty
        }
        Some(newest) if newest != armed_for => {
            trace!(
                "Stale settle check for group {}: armed for {}, newest {}",
                key,
                armed_for,
                newest
            );
            SettleOutcome::Stale { newest }
        }
        Some(_) => {
            info!("Processing group {}", key);
            match on_settled(key.clone()).await {
                Ok(()) => SettleOutcome::Settled,
                Err(e) => {
                    error!("Settle callback for group {} failed: {:#}", key, e);
                    SettleOutcome::CallbackFailed(e)
                }
            }
        }
    }
}
