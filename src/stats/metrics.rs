//! Relay-wide statistics
//!
//! Cumulative counters updated from the dispatcher and the per-consumer
//! sessions. All counters are relaxed atomics; `snapshot()` returns a plain
//! struct for display or assertions.

use std::sync::atomic::{AtomicU64, Ordering};

/// Cumulative relay counters
#[derive(Debug, Default)]
pub struct RelayStats {
    /// Frames accepted by the dispatcher
    frames_published: AtomicU64,
    /// Frames successfully written to consumer transports
    frames_delivered: AtomicU64,
    /// Frames discarded by the drop-oldest policy across all consumers
    frames_dropped: AtomicU64,
    /// Payload bytes accepted by the dispatcher
    bytes_published: AtomicU64,
    /// Payload bytes written to consumer transports
    bytes_delivered: AtomicU64,
    /// Streamed consumers ever attached
    consumers_attached: AtomicU64,
    /// Consumers evicted for a send timeout or transport error
    consumers_evicted: AtomicU64,
    /// Pull-style sampling sessions ever started
    samplers_attached: AtomicU64,
    /// Publisher connections rejected because one was already active
    publishers_rejected: AtomicU64,
}

impl RelayStats {
    /// Create zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a frame accepted by the dispatcher
    pub fn record_published(&self, bytes: usize) {
        self.frames_published.fetch_add(1, Ordering::Relaxed);
        self.bytes_published.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    /// Record a frame written to one consumer's transport
    pub fn record_delivered(&self, bytes: usize) {
        self.frames_delivered.fetch_add(1, Ordering::Relaxed);
        self.bytes_delivered.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    /// Record a frame discarded by the drop-oldest policy
    pub fn record_dropped(&self) {
        self.frames_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a streamed consumer attach
    pub fn record_attached(&self) {
        self.consumers_attached.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an eviction (send timeout or transport error)
    pub fn record_evicted(&self) {
        self.consumers_evicted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a sampling session start
    pub fn record_sampler(&self) {
        self.samplers_attached.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a rejected publisher connection
    pub fn record_publisher_rejected(&self) {
        self.publishers_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of all counters
    pub fn snapshot(&self) -> RelayStatsSnapshot {
        RelayStatsSnapshot {
            frames_published: self.frames_published.load(Ordering::Relaxed),
            frames_delivered: self.frames_delivered.load(Ordering::Relaxed),
            frames_dropped: self.frames_dropped.load(Ordering::Relaxed),
            bytes_published: self.bytes_published.load(Ordering::Relaxed),
            bytes_delivered: self.bytes_delivered.load(Ordering::Relaxed),
            consumers_attached: self.consumers_attached.load(Ordering::Relaxed),
            consumers_evicted: self.consumers_evicted.load(Ordering::Relaxed),
            samplers_attached: self.samplers_attached.load(Ordering::Relaxed),
            publishers_rejected: self.publishers_rejected.load(Ordering::Relaxed),
        }
    }
}

/// Plain snapshot of [`RelayStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayStatsSnapshot {
    /// Frames accepted by the dispatcher
    pub frames_published: u64,
    /// Frames successfully written to consumer transports
    pub frames_delivered: u64,
    /// Frames discarded by the drop-oldest policy
    pub frames_dropped: u64,
    /// Payload bytes accepted by the dispatcher
    pub bytes_published: u64,
    /// Payload bytes written to consumer transports
    pub bytes_delivered: u64,
    /// Streamed consumers ever attached
    pub consumers_attached: u64,
    /// Consumers evicted for a send timeout or transport error
    pub consumers_evicted: u64,
    /// Sampling sessions ever started
    pub samplers_attached: u64,
    /// Publisher connections rejected
    pub publishers_rejected: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_zeroed() {
        let snapshot = RelayStats::new().snapshot();
        assert_eq!(snapshot, RelayStatsSnapshot::default());
    }

    #[test]
    fn test_counters_accumulate() {
        let stats = RelayStats::new();

        stats.record_published(100);
        stats.record_published(50);
        stats.record_delivered(100);
        stats.record_dropped();
        stats.record_attached();
        stats.record_evicted();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.frames_published, 2);
        assert_eq!(snapshot.bytes_published, 150);
        assert_eq!(snapshot.frames_delivered, 1);
        assert_eq!(snapshot.bytes_delivered, 100);
        assert_eq!(snapshot.frames_dropped, 1);
        assert_eq!(snapshot.consumers_attached, 1);
        assert_eq!(snapshot.consumers_evicted, 1);
    }
}
