//! Media-group aggregation for Ratatoskr
//!
//! Albums arrive as several separate messages sharing a group key. This
//! crate collects them and fires one callback per album once the burst
//! has gone quiet:
//! - Keyed buffer with items kept in sequence order
//! - Per-group debouncing without timer cancellation
//! - Non-blocking arrival reporting

pub mod buffer;
pub mod debounce;

pub use buffer::{Item, KeyedOrderedBuffer, ALBUM_CAPACITY};
pub use debounce::{DebounceTrigger, SettleOutcome};

use rt_core::AggregatorConfig;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Media-group aggregator
///
/// Cheap to clone; clones share the same buffer.
pub struct Aggregator<P> {
    trigger: DebounceTrigger<P>,
}

impl<P> Clone for Aggregator<P> {
    fn clone(&self) -> Self {
        Self {
            trigger: self.trigger.clone(),
        }
    }
}

impl<P> Aggregator<P>
where
    P: Clone + Send + 'static,
{
    /// Create an aggregator with the given quiet window
    pub fn new(settle_delay: Duration) -> Self {
        Self {
            trigger: DebounceTrigger::new(Arc::new(KeyedOrderedBuffer::new()), settle_delay),
        }
    }

    /// Create an aggregator from loaded configuration
    pub fn from_config(config: &AggregatorConfig) -> Self {
        Self::new(config.settle_delay())
    }

    /// Report an arriving item
    ///
    /// Returns immediately. `on_settled` is invoked with the group key
    /// once no newer item for that key has arrived within the settle
    /// delay. The callback owns clearing the group and should do so before
    /// any `.await` (see [`Aggregator::take`]), or items arriving while it
    /// runs are cleared along with the settled ones.
    pub fn report_arrival<F, Fut>(&self, item: Item<P>, on_settled: F) -> JoinHandle<SettleOutcome>
    where
        F: FnOnce(String) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.trigger.report_arrival(item, on_settled)
    }

    /// Report an arriving item with an explicit settle delay
    pub fn report_arrival_after<F, Fut>(
        &self,
        item: Item<P>,
        settle_delay: Duration,
        on_settled: F,
    ) -> JoinHandle<SettleOutcome>
    where
        F: FnOnce(String) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.trigger.report_arrival_after(item, settle_delay, on_settled)
    }

    /// Ordered items currently buffered for a group
    pub fn snapshot(&self, group_key: &str) -> Vec<Item<P>> {
        self.trigger.buffer().get(group_key)
    }

    /// Remove a group and return its ordered items atomically
    pub fn take(&self, group_key: &str) -> Vec<Item<P>> {
        self.trigger.buffer().take(group_key)
    }

    /// Drop a group, returning how many items it held
    pub fn clear(&self, group_key: &str) -> usize {
        self.trigger.buffer().remove(group_key)
    }

    /// Number of groups waiting to settle or be cleared
    pub fn pending_groups(&self) -> usize {
        self.trigger.buffer().group_count()
    }

    /// Configured quiet window
    pub fn settle_delay(&self) -> Duration {
        self.trigger.settle_delay()
    }
}
