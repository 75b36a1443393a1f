//! Per-consumer delivery session
//!
//! One delivery session runs per streamed consumer for the consumer's
//! entire lifetime: it drains the consumer's queue and writes frames to the
//! transport under a bounded send timeout. A timeout or transport error is
//! fatal for this consumer only; the session closes the transport, detaches
//! itself from the registry, and ends. This self-eviction is the sole
//! mechanism for removing a slow or unresponsive consumer.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use crate::relay::{Consumer, ConsumerRegistry};
use crate::server::transport::FrameTransport;
use crate::stats::RelayStats;

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// Cancelled externally (peer disconnect or server shutdown)
    Cancelled,
    /// A frame write exceeded the send timeout
    WriteTimeout,
    /// The transport reported an error
    TransportError,
}

/// Queue-draining loop for one streamed consumer
pub struct DeliverySession<T: FrameTransport> {
    consumer: Arc<Consumer>,
    registry: Arc<ConsumerRegistry>,
    transport: T,
    send_timeout: Duration,
    cancel: CancellationToken,
    stats: Arc<RelayStats>,
}

impl<T: FrameTransport> DeliverySession<T> {
    /// Create a session for an attached consumer
    pub fn new(
        consumer: Arc<Consumer>,
        registry: Arc<ConsumerRegistry>,
        transport: T,
        send_timeout: Duration,
        cancel: CancellationToken,
        stats: Arc<RelayStats>,
    ) -> Self {
        Self {
            consumer,
            registry,
            transport,
            send_timeout,
            cancel,
            stats,
        }
    }

    /// Run until cancellation or a fatal write failure
    ///
    /// Always detaches the consumer before returning; detach is idempotent
    /// so racing an external disconnect notification is safe.
    pub async fn run(mut self) -> SessionEnd {
        let end = self.deliver_loop().await;

        // begin_close gates the close-once effects against the disconnect
        // watcher racing us into teardown.
        let first_closer = self.consumer.lifecycle.begin_close();

        match end {
            SessionEnd::Cancelled => {
                // No further writes after cancellation
            }
            SessionEnd::WriteTimeout | SessionEnd::TransportError => {
                self.transport.close().await;
                if first_closer {
                    self.stats.record_evicted();
                }
            }
        }

        self.registry.detach(self.consumer.id).await;

        tracing::debug!(
            consumer = %self.consumer.id,
            reason = ?end,
            "Delivery session ended"
        );
        end
    }

    async fn deliver_loop(&mut self) -> SessionEnd {
        loop {
            let frame = tokio::select! {
                _ = self.cancel.cancelled() => return SessionEnd::Cancelled,
                frame = self.consumer.queue.take() => frame,
            };

            let write = timeout(self.send_timeout, self.transport.write_frame(&frame));
            let result = tokio::select! {
                _ = self.cancel.cancelled() => return SessionEnd::Cancelled,
                result = write => result,
            };

            match result {
                Ok(Ok(())) => {
                    self.stats.record_delivered(frame.len());
                }
                Ok(Err(e)) => {
                    tracing::debug!(
                        consumer = %self.consumer.id,
                        sequence_id = frame.sequence_id,
                        error = %e,
                        "Transport write failed, evicting consumer"
                    );
                    return SessionEnd::TransportError;
                }
                Err(_) => {
                    tracing::warn!(
                        consumer = %self.consumer.id,
                        sequence_id = frame.sequence_id,
                        timeout_ms = self.send_timeout.as_millis() as u64,
                        "Frame write timed out, evicting consumer"
                    );
                    return SessionEnd::WriteTimeout;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use crate::relay::{ConsumerId, Dispatcher};
    use crate::server::transport::mock::{BrokenTransport, RecordingTransport, StalledTransport};

    use super::*;

    async fn attach_consumer(
        registry: &Arc<ConsumerRegistry>,
        id: u64,
        capacity: usize,
    ) -> Arc<Consumer> {
        let consumer = Arc::new(Consumer::new(ConsumerId(id), capacity));
        registry.attach(Arc::clone(&consumer)).await.unwrap();
        consumer
    }

    fn session<T: FrameTransport>(
        consumer: Arc<Consumer>,
        registry: Arc<ConsumerRegistry>,
        transport: T,
        cancel: CancellationToken,
    ) -> DeliverySession<T> {
        DeliverySession::new(
            consumer,
            registry,
            transport,
            Duration::from_secs(1),
            cancel,
            Arc::new(RelayStats::new()),
        )
    }

    #[tokio::test]
    async fn test_delivers_queued_frames_in_order() {
        let registry = Arc::new(ConsumerRegistry::new());
        let dispatcher = Dispatcher::new(Arc::clone(&registry));

        let consumer = Arc::new(Consumer::new(ConsumerId(1), 8));
        registry.attach(Arc::clone(&consumer)).await.unwrap();

        let transport = RecordingTransport::new();
        let delivered = transport.clone();
        let cancel = CancellationToken::new();

        let handle = tokio::spawn(
            session(consumer, Arc::clone(&registry), transport, cancel.clone()).run(),
        );

        for _ in 0..5 {
            dispatcher.publish(Bytes::from_static(b"f")).await;
        }

        // Let the session drain, then cancel it
        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();

        assert_eq!(handle.await.unwrap(), SessionEnd::Cancelled);
        assert_eq!(delivered.delivered_ids(), vec![1, 2, 3, 4, 5]);
        // Cancellation still detaches
        assert!(registry.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_write_timeout_evicts() {
        let registry = Arc::new(ConsumerRegistry::new());
        let consumer = attach_consumer(&registry, 1, 4).await;

        let transport = StalledTransport::default();
        let closed = Arc::clone(&transport.closed);
        let stats = Arc::new(RelayStats::new());

        let delivery = DeliverySession::new(
            Arc::clone(&consumer),
            Arc::clone(&registry),
            transport,
            Duration::from_secs(1),
            CancellationToken::new(),
            Arc::clone(&stats),
        );
        let handle = tokio::spawn(delivery.run());

        consumer
            .queue
            .offer(crate::relay::Frame::new(1, Bytes::from_static(b"f")));

        // Paused clock auto-advances through the 1s timeout
        assert_eq!(handle.await.unwrap(), SessionEnd::WriteTimeout);
        assert!(*closed.lock().unwrap());
        assert!(registry.is_empty().await);
        assert_eq!(stats.snapshot().consumers_evicted, 1);
    }

    #[tokio::test]
    async fn test_transport_error_evicts() {
        let registry = Arc::new(ConsumerRegistry::new());
        let consumer = attach_consumer(&registry, 1, 4).await;

        let transport = BrokenTransport::default();
        let closed = Arc::clone(&transport.closed);

        let delivery = session(
            Arc::clone(&consumer),
            Arc::clone(&registry),
            transport,
            CancellationToken::new(),
        );
        let handle = tokio::spawn(delivery.run());

        consumer
            .queue
            .offer(crate::relay::Frame::new(1, Bytes::from_static(b"f")));

        assert_eq!(handle.await.unwrap(), SessionEnd::TransportError);
        assert!(*closed.lock().unwrap());
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_cancel_races_self_eviction() {
        // External disconnect and fatal write error hitting together must
        // still produce exactly one removal.
        let registry = Arc::new(ConsumerRegistry::new());
        let consumer = attach_consumer(&registry, 1, 4).await;

        let cancel = CancellationToken::new();
        let delivery = session(
            Arc::clone(&consumer),
            Arc::clone(&registry),
            BrokenTransport::default(),
            cancel.clone(),
        );
        let handle = tokio::spawn(delivery.run());

        consumer
            .queue
            .offer(crate::relay::Frame::new(1, Bytes::from_static(b"f")));
        cancel.cancel();
        let _ = registry.detach(ConsumerId(1)).await;

        handle.await.unwrap();
        // Whichever path won, the id is gone and no error occurred
        assert!(registry.is_empty().await);
        assert!(!registry.detach(ConsumerId(1)).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_consumer_does_not_delay_healthy_one() {
        let registry = Arc::new(ConsumerRegistry::new());
        let dispatcher = Dispatcher::new(Arc::clone(&registry));

        let stalled = Arc::new(Consumer::new(ConsumerId(1), 4));
        let healthy = Arc::new(Consumer::new(ConsumerId(2), 8));
        registry.attach(Arc::clone(&stalled)).await.unwrap();
        registry.attach(Arc::clone(&healthy)).await.unwrap();

        let stalled_session = session(
            stalled,
            Arc::clone(&registry),
            StalledTransport::default(),
            CancellationToken::new(),
        );
        let stalled_handle = tokio::spawn(stalled_session.run());

        let recording = RecordingTransport::new();
        let delivered = recording.clone();
        let cancel = CancellationToken::new();
        let healthy_session = session(healthy, Arc::clone(&registry), recording, cancel.clone());
        let healthy_handle = tokio::spawn(healthy_session.run());

        for _ in 0..3 {
            dispatcher.publish(Bytes::from_static(b"f")).await;
        }

        // The stalled consumer is evicted within one timeout interval
        assert_eq!(stalled_handle.await.unwrap(), SessionEnd::WriteTimeout);

        // The healthy consumer received everything meanwhile
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(delivered.delivered_ids(), vec![1, 2, 3]);

        cancel.cancel();
        healthy_handle.await.unwrap();
    }
}
