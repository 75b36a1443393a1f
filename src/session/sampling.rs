//! Pull-style sampling session
//!
//! The pull variant of delivery: instead of draining a queue, the session
//! polls the latest-frame slot on a fixed interval and sends only when the
//! sequence id advanced since the last send. Sampling consumers own no
//! queue and are invisible to the dispatcher's fan-out. Timeout and error
//! handling match the streamed path.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{timeout, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::relay::{ConsumerId, LatestSlot};
use crate::server::transport::FrameTransport;
use crate::stats::RelayStats;

use super::delivery::SessionEnd;

/// Fixed-interval latest-slot polling loop for one consumer
pub struct SamplingSession<T: FrameTransport> {
    id: ConsumerId,
    slot: Arc<LatestSlot>,
    transport: T,
    poll_interval: Duration,
    send_timeout: Duration,
    cancel: CancellationToken,
    stats: Arc<RelayStats>,
}

impl<T: FrameTransport> SamplingSession<T> {
    /// Create a sampling session
    pub fn new(
        id: ConsumerId,
        slot: Arc<LatestSlot>,
        transport: T,
        poll_interval: Duration,
        send_timeout: Duration,
        cancel: CancellationToken,
        stats: Arc<RelayStats>,
    ) -> Self {
        Self {
            id,
            slot,
            transport,
            poll_interval,
            send_timeout,
            cancel,
            stats,
        }
    }

    /// Run until cancellation or a fatal write failure
    pub async fn run(mut self) -> SessionEnd {
        let end = self.sample_loop().await;

        match end {
            SessionEnd::Cancelled => {}
            SessionEnd::WriteTimeout | SessionEnd::TransportError => {
                self.transport.close().await;
            }
        }

        tracing::debug!(consumer = %self.id, reason = ?end, "Sampling session ended");
        end
    }

    async fn sample_loop(&mut self) -> SessionEnd {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        // Sequence id of the last frame sent; 0 is below any assigned id
        let mut last_sent = 0u64;

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => return SessionEnd::Cancelled,
                _ = ticker.tick() => {}
            }

            // Nothing published yet, or nothing new since the last send
            let Some(frame) = self.slot.get() else {
                continue;
            };
            if frame.sequence_id == last_sent {
                continue;
            }

            let write = timeout(self.send_timeout, self.transport.write_frame(&frame));
            let result = tokio::select! {
                _ = self.cancel.cancelled() => return SessionEnd::Cancelled,
                result = write => result,
            };

            match result {
                Ok(Ok(())) => {
                    last_sent = frame.sequence_id;
                    self.stats.record_delivered(frame.len());
                }
                Ok(Err(e)) => {
                    tracing::debug!(
                        consumer = %self.id,
                        sequence_id = frame.sequence_id,
                        error = %e,
                        "Sample write failed"
                    );
                    return SessionEnd::TransportError;
                }
                Err(_) => {
                    tracing::warn!(
                        consumer = %self.id,
                        sequence_id = frame.sequence_id,
                        timeout_ms = self.send_timeout.as_millis() as u64,
                        "Sample write timed out"
                    );
                    return SessionEnd::WriteTimeout;
                }
            }
        }
    }
}
