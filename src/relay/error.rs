//! Registry error types

use super::frame::ConsumerId;

/// Error type for registry operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// A consumer with this identity is already attached. Defensive check
    /// only; identities come from a monotonic counter and should never
    /// collide under a correct transport layer.
    DuplicateConsumer(ConsumerId),
    /// The configured consumer limit is already reached
    AtCapacity(usize),
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::DuplicateConsumer(id) => {
                write!(f, "Consumer already attached: {}", id)
            }
            RegistryError::AtCapacity(limit) => {
                write!(f, "Consumer limit reached: {}", limit)
            }
        }
    }
}

impl std::error::Error for RegistryError {}
