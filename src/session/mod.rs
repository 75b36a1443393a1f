//! Per-consumer sessions
//!
//! A streamed consumer gets a [`DeliverySession`] that drains its queue; a
//! pull-style consumer gets a [`SamplingSession`] that polls the latest
//! slot. Both enforce the send timeout and end the connection on failure.

pub mod delivery;
pub mod lifecycle;
pub mod sampling;

pub use delivery::{DeliverySession, SessionEnd};
pub use lifecycle::{ConnectionLifecycle, ConnectionState};
pub use sampling::SamplingSession;
