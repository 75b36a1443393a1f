//! Bounded drop-oldest frame queue
//!
//! The single backpressure primitive of the relay: a bounded queue that
//! prefers recency over completeness. When full, `offer` evicts the single
//! oldest queued frame to make room and retries once; it never blocks the
//! caller and never grows past its capacity. Capacity 1 gives latest-only
//! semantics; a small capacity > 1 gives a jitter buffer.

use std::collections::VecDeque;
use std::sync::Mutex;

use tokio::sync::Notify;

use super::frame::Frame;

/// Outcome of a non-blocking enqueue attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferOutcome {
    /// Frame was enqueued without eviction
    Enqueued,
    /// Queue was full; the oldest queued frame was discarded to make room
    EvictedOldest,
    /// Frame could not be enqueued even after one eviction
    Dropped,
}

/// Bounded queue with drop-oldest overflow policy
///
/// Writers use the non-blocking [`offer`](FrameQueue::offer); the single
/// reader awaits frames with [`take`](FrameQueue::take). Each queue is
/// independently synchronized, so contention on one consumer's queue never
/// stalls another's.
#[derive(Debug)]
pub struct FrameQueue {
    /// Queued frames, oldest at the front. The lock is only held for O(1)
    /// push/pop and is never held across an await.
    frames: Mutex<VecDeque<Frame>>,
    /// Wakes the reader when a frame arrives
    notify: Notify,
    /// Maximum queued frames, always >= 1
    capacity: usize,
}

impl FrameQueue {
    /// Create a queue with the given capacity (clamped to at least 1)
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            frames: Mutex::new(VecDeque::with_capacity(capacity)),
            notify: Notify::new(),
            capacity,
        }
    }

    /// Queue capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of currently queued frames
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Attempt a non-blocking enqueue
    ///
    /// If the queue is full, the oldest queued frame is discarded and the
    /// enqueue retried exactly once. At most one eviction per call; the
    /// frame is dropped rather than looping.
    pub fn offer(&self, frame: Frame) -> OfferOutcome {
        let outcome = {
            let mut frames = self.lock();
            if frames.len() < self.capacity {
                frames.push_back(frame);
                OfferOutcome::Enqueued
            } else {
                frames.pop_front();
                if frames.len() < self.capacity {
                    frames.push_back(frame);
                    OfferOutcome::EvictedOldest
                } else {
                    OfferOutcome::Dropped
                }
            }
        };

        if outcome != OfferOutcome::Dropped {
            self.notify.notify_one();
        }
        outcome
    }

    /// Take the oldest queued frame without waiting
    pub fn try_take(&self) -> Option<Frame> {
        self.lock().pop_front()
    }

    /// Await the next frame
    ///
    /// Suspends until a frame is available. Intended for a single reader.
    pub async fn take(&self) -> Frame {
        loop {
            // Register for notification before checking, so an offer that
            // lands between the check and the await is not lost.
            let notified = self.notify.notified();
            if let Some(frame) = self.try_take() {
                return frame;
            }
            notified.await;
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Frame>> {
        // A poisoned lock only means another thread panicked mid-operation;
        // the VecDeque itself is still in a consistent state.
        self.frames
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
