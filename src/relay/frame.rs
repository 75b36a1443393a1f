//! Frame and consumer identity types
//!
//! The relay treats frame contents as opaque bytes; the only structure it
//! adds is a monotonically increasing sequence id assigned by the
//! [`Dispatcher`](super::Dispatcher).

use bytes::Bytes;

/// Unique identifier for an attached consumer
///
/// Allocated from the server's session counter; never reused. A consumer
/// that reconnects gets a brand-new identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConsumerId(pub u64);

impl std::fmt::Display for ConsumerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "consumer-{}", self.0)
    }
}

/// One relayed frame
///
/// This is designed to be cheap to clone due to `Bytes` reference counting:
/// fan-out to N consumers shares one payload allocation.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Monotonic sequence id, starts at 1, increments by exactly 1 per
    /// frame accepted by the dispatcher, never reused
    pub sequence_id: u64,
    /// Opaque frame data (zero-copy via reference counting)
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame
    pub fn new(sequence_id: u64, payload: Bytes) -> Self {
        Self {
            sequence_id,
            payload,
        }
    }

    /// Payload length in bytes
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// Whether the payload is empty
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}
