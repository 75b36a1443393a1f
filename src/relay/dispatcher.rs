//! Frame dispatcher
//!
//! The producer-facing entry point of the relay. `publish` assigns the next
//! sequence id, updates the latest-frame slot, and fans the frame out to
//! every registered consumer with a non-blocking drop-oldest enqueue. It
//! never waits on a consumer queue or transport, so producer throughput is
//! independent of consumer count and speed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bytes::Bytes;

use crate::stats::RelayStats;

use super::frame::Frame;
use super::queue::OfferOutcome;
use super::registry::ConsumerRegistry;
use super::slot::LatestSlot;

/// Fans producer frames out to all registered consumers
///
/// The dispatcher owns sequence id assignment and the [`LatestSlot`]. It
/// never errors on a slow or unreachable consumer; dead consumers are
/// discovered and removed by their own delivery sessions.
pub struct Dispatcher {
    registry: Arc<ConsumerRegistry>,
    slot: Arc<LatestSlot>,
    stats: Arc<RelayStats>,
    /// Next sequence id to assign; ids start at 1
    next_sequence_id: AtomicU64,
}

impl Dispatcher {
    /// Create a dispatcher with its own stats counters
    pub fn new(registry: Arc<ConsumerRegistry>) -> Self {
        Self::with_stats(registry, Arc::new(RelayStats::new()))
    }

    /// Create a dispatcher sharing the given stats counters
    pub fn with_stats(registry: Arc<ConsumerRegistry>, stats: Arc<RelayStats>) -> Self {
        Self {
            registry,
            slot: Arc::new(LatestSlot::new()),
            stats,
            next_sequence_id: AtomicU64::new(1),
        }
    }

    /// The latest-frame slot, for pull-style consumers
    pub fn slot(&self) -> &Arc<LatestSlot> {
        &self.slot
    }

    /// The consumer registry this dispatcher fans out to
    pub fn registry(&self) -> &Arc<ConsumerRegistry> {
        &self.registry
    }

    /// Stats counters
    pub fn stats(&self) -> &Arc<RelayStats> {
        &self.stats
    }

    /// Publish one frame
    ///
    /// Assigns the next sequence id, writes the latest-frame slot, then
    /// attempts a non-blocking enqueue onto every registered consumer's
    /// queue. A full queue costs that consumer its oldest pending frame
    /// (at most one eviction per consumer per publish); other consumers
    /// are unaffected. Returns the assigned sequence id.
    pub async fn publish(&self, payload: Bytes) -> u64 {
        let sequence_id = self.next_sequence_id.fetch_add(1, Ordering::Relaxed);
        let frame = Frame::new(sequence_id, payload);

        self.stats.record_published(frame.len());
        self.slot.set(frame.clone());

        // Snapshot, then fan out without holding the registry lock. Each
        // queue is independently synchronized, so one stalled consumer
        // cannot delay the rest.
        let consumers = self.registry.snapshot().await;
        for consumer in &consumers {
            match consumer.queue.offer(frame.clone()) {
                OfferOutcome::Enqueued => {}
                OfferOutcome::EvictedOldest => {
                    self.stats.record_dropped();
                    tracing::trace!(
                        consumer = %consumer.id,
                        sequence_id,
                        "Evicted oldest queued frame for slow consumer"
                    );
                }
                OfferOutcome::Dropped => {
                    self.stats.record_dropped();
                    tracing::trace!(
                        consumer = %consumer.id,
                        sequence_id,
                        "Frame dropped for slow consumer"
                    );
                }
            }
        }

        tracing::trace!(
            sequence_id,
            consumers = consumers.len(),
            "Frame published"
        );

        sequence_id
    }
}
