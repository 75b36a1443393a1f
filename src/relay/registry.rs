//! Consumer registry
//!
//! The central set of attached streamed consumers. This is the only state
//! mutated concurrently by unrelated tasks: the dispatcher reads snapshots
//! for fan-out, delivery sessions self-evict, and disconnect watchers
//! detach externally. All mutation is serialized behind one `RwLock`;
//! detach is idempotent so racing teardown triggers are safe.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::consumer::Consumer;
use super::error::RegistryError;
use super::frame::ConsumerId;

/// Registry of currently attached streamed consumers
///
/// Thread-safe via `RwLock`; the fan-out path only ever takes the read
/// lock, and never holds it while touching a consumer's queue.
pub struct ConsumerRegistry {
    consumers: RwLock<HashMap<ConsumerId, Arc<Consumer>>>,
}

impl ConsumerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            consumers: RwLock::new(HashMap::new()),
        }
    }

    /// Attach a newly connected consumer
    ///
    /// On success the consumer's lifecycle moves `Connecting → Active`.
    /// Fails with [`RegistryError::DuplicateConsumer`] if the identity is
    /// already present.
    pub async fn attach(&self, consumer: Arc<Consumer>) -> Result<(), RegistryError> {
        self.attach_with_limit(consumer, 0).await
    }

    /// Attach a consumer subject to a capacity limit
    ///
    /// The length check and the insert happen under the same write lock,
    /// so racing connects cannot overshoot the cap. A `limit` of zero
    /// means unlimited.
    pub async fn attach_with_limit(
        &self,
        consumer: Arc<Consumer>,
        limit: usize,
    ) -> Result<(), RegistryError> {
        let mut consumers = self.consumers.write().await;

        if limit > 0 && consumers.len() >= limit {
            return Err(RegistryError::AtCapacity(limit));
        }

        if consumers.contains_key(&consumer.id) {
            return Err(RegistryError::DuplicateConsumer(consumer.id));
        }

        consumer.lifecycle.activate();

        tracing::info!(
            consumer = %consumer.id,
            queue_capacity = consumer.queue.capacity(),
            total = consumers.len() + 1,
            "Consumer attached"
        );

        consumers.insert(consumer.id, consumer);
        Ok(())
    }

    /// Detach a consumer; idempotent
    ///
    /// Safe to call concurrently from the delivery session (self-eviction)
    /// and an external disconnect notification: whichever caller arrives
    /// first performs the removal and observes `true`, the other observes a
    /// no-op `false`.
    pub async fn detach(&self, id: ConsumerId) -> bool {
        let removed = self.consumers.write().await.remove(&id);

        match removed {
            Some(consumer) => {
                consumer.lifecycle.mark_removed();
                tracing::info!(
                    consumer = %id,
                    queued = consumer.queue.len(),
                    age_ms = consumer.age().as_millis() as u64,
                    "Consumer detached"
                );
                true
            }
            None => {
                tracing::debug!(consumer = %id, "Detach for unknown consumer ignored");
                false
            }
        }
    }

    /// Point-in-time copy of all attached consumers
    ///
    /// The dispatcher iterates this copy during fan-out instead of holding
    /// the registry lock across per-consumer enqueues.
    pub async fn snapshot(&self) -> Vec<Arc<Consumer>> {
        self.consumers.read().await.values().cloned().collect()
    }

    /// Number of attached consumers
    pub async fn len(&self) -> usize {
        self.consumers.read().await.len()
    }

    /// Whether the registry is empty
    pub async fn is_empty(&self) -> bool {
        self.consumers.read().await.is_empty()
    }

    /// Whether a consumer with this id is attached
    pub async fn contains(&self, id: ConsumerId) -> bool {
        self.consumers.read().await.contains_key(&id)
    }
}

impl Default for ConsumerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use crate::session::lifecycle::ConnectionState;

    use super::*;

    fn consumer(id: u64) -> Arc<Consumer> {
        Arc::new(Consumer::new(ConsumerId(id), 4))
    }

    #[tokio::test]
    async fn test_attach_activates() {
        let registry = ConsumerRegistry::new();
        let c = consumer(1);

        registry.attach(Arc::clone(&c)).await.unwrap();

        assert_eq!(registry.len().await, 1);
        assert!(registry.contains(ConsumerId(1)).await);
        assert_eq!(c.lifecycle.state(), ConnectionState::Active);
    }

    #[tokio::test]
    async fn test_duplicate_attach_rejected() {
        let registry = ConsumerRegistry::new();

        registry.attach(consumer(1)).await.unwrap();
        let result = registry.attach(consumer(1)).await;

        assert!(matches!(
            result,
            Err(RegistryError::DuplicateConsumer(ConsumerId(1)))
        ));
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_attach_with_limit_rejects_at_capacity() {
        let registry = ConsumerRegistry::new();
        registry.attach_with_limit(consumer(1), 1).await.unwrap();

        let result = registry.attach_with_limit(consumer(2), 1).await;
        assert!(matches!(result, Err(RegistryError::AtCapacity(1))));
        assert_eq!(registry.len().await, 1);

        // Zero means unlimited
        registry.attach_with_limit(consumer(2), 0).await.unwrap();
        assert_eq!(registry.len().await, 2);
    }

    #[tokio::test]
    async fn test_racing_attaches_cannot_overshoot_limit() {
        let registry = Arc::new(ConsumerRegistry::new());

        let a = {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move { registry.attach_with_limit(consumer(1), 1).await })
        };
        let b = {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move { registry.attach_with_limit(consumer(2), 1).await })
        };

        let (a, b) = (a.await.unwrap(), b.await.unwrap());
        assert!(a.is_ok() ^ b.is_ok(), "exactly one attach may win");
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_detach_idempotent() {
        let registry = ConsumerRegistry::new();
        registry.attach(consumer(1)).await.unwrap();

        assert!(registry.detach(ConsumerId(1)).await);
        assert!(!registry.detach(ConsumerId(1)).await);
        assert!(!registry.detach(ConsumerId(99)).await);
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_concurrent_detach_single_removal() {
        // Simulates the race between timeout-eviction and an external
        // disconnect notification.
        let registry = Arc::new(ConsumerRegistry::new());
        registry.attach(consumer(1)).await.unwrap();

        let a = {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move { registry.detach(ConsumerId(1)).await })
        };
        let b = {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move { registry.detach(ConsumerId(1)).await })
        };

        let (a, b) = (a.await.unwrap(), b.await.unwrap());
        assert!(a ^ b, "exactly one detach must win");
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_snapshot_is_point_in_time() {
        let registry = ConsumerRegistry::new();
        registry.attach(consumer(1)).await.unwrap();
        registry.attach(consumer(2)).await.unwrap();

        let snapshot = registry.snapshot().await;
        assert_eq!(snapshot.len(), 2);

        // Mutating the registry does not affect the copy
        registry.detach(ConsumerId(1)).await;
        assert_eq!(snapshot.len(), 2);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_detach_marks_removed() {
        let registry = ConsumerRegistry::new();
        let c = consumer(1);
        registry.attach(Arc::clone(&c)).await.unwrap();

        registry.detach(ConsumerId(1)).await;
        assert_eq!(c.lifecycle.state(), ConnectionState::Removed);
    }
}
