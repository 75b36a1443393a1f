//! Connection lifecycle state machine
//!
//! Tracks a consumer connection from attach to removal. Two independent
//! triggers can race to tear a consumer down (self-eviction inside the
//! delivery session, and the external disconnect watcher), so transitions
//! are CAS-based: entering `Closing` succeeds for exactly one caller, and
//! `Removed` may be reached redundantly without double effects.

use std::sync::atomic::{AtomicU8, Ordering};

/// Connection state
///
/// `Connecting → Active → Closing → Removed`; `Removed` is terminal and no
/// transition leads back to `Active`. A dropped consumer must reconnect
/// under a brand-new identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnectionState {
    /// Transport accepted, not yet attached to the registry
    Connecting = 0,
    /// Attached; delivery in progress
    Active = 1,
    /// Teardown started by exactly one trigger
    Closing = 2,
    /// Cleanup complete (terminal)
    Removed = 3,
}

impl ConnectionState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => ConnectionState::Connecting,
            1 => ConnectionState::Active,
            2 => ConnectionState::Closing,
            _ => ConnectionState::Removed,
        }
    }
}

/// Atomic lifecycle state for one consumer connection
#[derive(Debug)]
pub struct ConnectionLifecycle {
    state: AtomicU8,
}

impl ConnectionLifecycle {
    /// Create a lifecycle in the `Connecting` state
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(ConnectionState::Connecting as u8),
        }
    }

    /// Current state
    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Transition `Connecting → Active` (registry attach succeeded)
    ///
    /// Returns false if the connection already started closing.
    pub fn activate(&self) -> bool {
        self.state
            .compare_exchange(
                ConnectionState::Connecting as u8,
                ConnectionState::Active as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Begin teardown
    ///
    /// Exactly one caller observes `true`; concurrent or repeated calls
    /// observe `false`. Close-once effects (transport shutdown, eviction
    /// accounting) belong behind this gate.
    pub fn begin_close(&self) -> bool {
        self.state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |raw| {
                match ConnectionState::from_u8(raw) {
                    ConnectionState::Connecting | ConnectionState::Active => {
                        Some(ConnectionState::Closing as u8)
                    }
                    ConnectionState::Closing | ConnectionState::Removed => None,
                }
            })
            .is_ok()
    }

    /// Enter the terminal `Removed` state; idempotent
    pub fn mark_removed(&self) {
        self.state
            .store(ConnectionState::Removed as u8, Ordering::Release);
    }

    /// Whether the connection is attached and delivering
    pub fn is_active(&self) -> bool {
        self.state() == ConnectionState::Active
    }

    /// Whether teardown has started or completed
    pub fn is_closing(&self) -> bool {
        matches!(
            self.state(),
            ConnectionState::Closing | ConnectionState::Removed
        )
    }
}

impl Default for ConnectionLifecycle {
    fn default() -> Self {
        Self::new()
    }
}
