//! Relay configuration

use std::time::Duration;

/// Default per-consumer queue capacity
pub const DEFAULT_QUEUE_CAPACITY: usize = 4;

/// Default bound on a single frame write to a consumer transport
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(1);

/// Default poll interval for pull-style consumers (~30 Hz)
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(33);

/// Relay behavior options
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Per-consumer queue capacity K. K = 1 gives latest-only delivery,
    /// K > 1 a small jitter buffer. Clamped to at least 1.
    pub queue_capacity: usize,

    /// Bound on a single frame write; exceeding it evicts the consumer
    pub send_timeout: Duration,

    /// Cadence at which sampling sessions poll the latest-frame slot
    pub poll_interval: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            send_timeout: DEFAULT_SEND_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl RelayConfig {
    /// Set the per-consumer queue capacity (clamped to at least 1)
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    /// Set the send timeout
    pub fn send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = timeout;
        self
    }

    /// Set the sampling poll interval
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RelayConfig::default();

        assert_eq!(config.queue_capacity, DEFAULT_QUEUE_CAPACITY);
        assert_eq!(config.send_timeout, Duration::from_secs(1));
        assert_eq!(config.poll_interval, Duration::from_millis(33));
    }

    #[test]
    fn test_builder_queue_capacity() {
        let config = RelayConfig::default().queue_capacity(1);
        assert_eq!(config.queue_capacity, 1);
    }

    #[test]
    fn test_builder_queue_capacity_clamped() {
        let config = RelayConfig::default().queue_capacity(0);
        assert_eq!(config.queue_capacity, 1);
    }

    #[test]
    fn test_builder_chaining() {
        let config = RelayConfig::default()
            .queue_capacity(8)
            .send_timeout(Duration::from_millis(250))
            .poll_interval(Duration::from_millis(16));

        assert_eq!(config.queue_capacity, 8);
        assert_eq!(config.send_timeout, Duration::from_millis(250));
        assert_eq!(config.poll_interval, Duration::from_millis(16));
    }
}
