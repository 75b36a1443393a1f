//! Latest-frame slot
//!
//! Single-slot cache holding the most recent published frame. Writes
//! overwrite unconditionally; reads return a consistent snapshot or `None`
//! if nothing was ever published. Pull-style consumers poll this slot at
//! their own cadence instead of attaching a queue.

use tokio::sync::watch;

use super::frame::Frame;

/// Single-slot cache of the most recent frame
///
/// Backed by a `watch` channel, which gives torn-read-free snapshots on its
/// own internal lock, decoupled from the registry. The held sequence id is
/// non-decreasing as long as the dispatcher is the sole writer.
#[derive(Debug)]
pub struct LatestSlot {
    tx: watch::Sender<Option<Frame>>,
}

impl LatestSlot {
    /// Create an empty slot
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    /// Replace the held frame unconditionally; O(1), never blocks
    pub fn set(&self, frame: Frame) {
        self.tx.send_replace(Some(frame));
    }

    /// Snapshot of the current frame, or `None` if nothing was ever set
    ///
    /// Never blocks, never fails. Callers compare the returned sequence id
    /// against the last one they handled to skip redundant sends.
    pub fn get(&self) -> Option<Frame> {
        self.tx.borrow().clone()
    }
}

impl Default for LatestSlot {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    #[test]
    fn test_empty_until_first_set() {
        let slot = LatestSlot::new();
        assert!(slot.get().is_none());
    }

    #[test]
    fn test_set_overwrites() {
        let slot = LatestSlot::new();

        slot.set(Frame::new(1, Bytes::from_static(b"a")));
        slot.set(Frame::new(2, Bytes::from_static(b"b")));

        let frame = slot.get().unwrap();
        assert_eq!(frame.sequence_id, 2);
        assert_eq!(&frame.payload[..], b"b");
    }

    #[test]
    fn test_get_is_nonconsuming() {
        let slot = LatestSlot::new();
        slot.set(Frame::new(3, Bytes::from_static(b"c")));

        assert_eq!(slot.get().unwrap().sequence_id, 3);
        assert_eq!(slot.get().unwrap().sequence_id, 3);
    }
}
