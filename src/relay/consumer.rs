//! Per-consumer record
//!
//! One `Consumer` exists per attached streamed endpoint, shared as
//! `Arc<Consumer>` between the registry (owner of record), the dispatcher
//! (queue writer via snapshot), and the consumer's own delivery session
//! (queue reader).

use std::time::Instant;

use crate::session::lifecycle::ConnectionLifecycle;

use super::frame::ConsumerId;
use super::queue::FrameQueue;

/// One attached streamed consumer
#[derive(Debug)]
pub struct Consumer {
    /// Unique identity, never reused
    pub id: ConsumerId,

    /// Bounded delivery queue; written by the dispatcher, drained by the
    /// consumer's delivery session
    pub queue: FrameQueue,

    /// Connection lifecycle state
    pub lifecycle: ConnectionLifecycle,

    /// When the consumer was created
    pub attached_at: Instant,
}

impl Consumer {
    /// Create a consumer with the given queue capacity
    pub fn new(id: ConsumerId, queue_capacity: usize) -> Self {
        Self {
            id,
            queue: FrameQueue::with_capacity(queue_capacity),
            lifecycle: ConnectionLifecycle::new(),
            attached_at: Instant::now(),
        }
    }

    /// Time since the consumer connected
    pub fn age(&self) -> std::time::Duration {
        self.attached_at.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use crate::session::lifecycle::ConnectionState;

    use super::*;

    #[test]
    fn test_new_consumer() {
        let consumer = Consumer::new(ConsumerId(5), 4);

        assert_eq!(consumer.id, ConsumerId(5));
        assert_eq!(consumer.queue.capacity(), 4);
        assert!(consumer.queue.is_empty());
        assert_eq!(consumer.lifecycle.state(), ConnectionState::Connecting);
    }
}
