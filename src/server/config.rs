//! Server configuration

use std::net::SocketAddr;
use std::time::Duration;

use crate::relay::RelayConfig;

/// Default maximum on-wire frame size (16 MiB)
pub const DEFAULT_MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

/// Server configuration options
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_addr: SocketAddr,

    /// Maximum attached streamed consumers (0 = unlimited)
    pub max_consumers: usize,

    /// Maximum accepted on-wire frame size
    pub max_frame_size: usize,

    /// Enable TCP_NODELAY (disable Nagle's algorithm)
    pub tcp_nodelay: bool,

    /// Relay behavior (queue capacity, send timeout, poll interval)
    pub relay: RelayConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:9000".parse().expect("valid default addr"),
            max_consumers: 0, // Unlimited
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            tcp_nodelay: true, // Important for low latency
            relay: RelayConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Create a config with a custom bind address
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            bind_addr: addr,
            ..Default::default()
        }
    }

    /// Set the bind address
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Set the maximum streamed consumer count (0 = unlimited)
    pub fn max_consumers(mut self, max: usize) -> Self {
        self.max_consumers = max;
        self
    }

    /// Set the maximum on-wire frame size
    pub fn max_frame_size(mut self, size: usize) -> Self {
        self.max_frame_size = size;
        self
    }

    /// Set the per-consumer queue capacity
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.relay = self.relay.queue_capacity(capacity);
        self
    }

    /// Set the send timeout
    pub fn send_timeout(mut self, timeout: Duration) -> Self {
        self.relay = self.relay.send_timeout(timeout);
        self
    }

    /// Set the sampling poll interval
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.relay = self.relay.poll_interval(interval);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();

        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.max_consumers, 0);
        assert_eq!(config.max_frame_size, DEFAULT_MAX_FRAME_SIZE);
        assert!(config.tcp_nodelay);
        assert_eq!(config.relay.queue_capacity, 4);
    }

    #[test]
    fn test_with_addr() {
        let addr: SocketAddr = "127.0.0.1:9001".parse().unwrap();
        let config = ServerConfig::with_addr(addr);

        assert_eq!(config.bind_addr.port(), 9001);
    }

    #[test]
    fn test_builder_chaining() {
        let addr: SocketAddr = "127.0.0.1:9000".parse().unwrap();
        let config = ServerConfig::default()
            .bind(addr)
            .max_consumers(50)
            .max_frame_size(1024 * 1024)
            .queue_capacity(1)
            .send_timeout(Duration::from_millis(500))
            .poll_interval(Duration::from_millis(16));

        assert_eq!(config.bind_addr, addr);
        assert_eq!(config.max_consumers, 50);
        assert_eq!(config.max_frame_size, 1024 * 1024);
        assert_eq!(config.relay.queue_capacity, 1);
        assert_eq!(config.relay.send_timeout, Duration::from_millis(500));
        assert_eq!(config.relay.poll_interval, Duration::from_millis(16));
    }
}
