//! Frame relay core
//!
//! One producer feeds the [`Dispatcher`]; every attached consumer drains
//! its own bounded [`FrameQueue`] at its own pace. Freshness wins over
//! completeness: a consumer that falls behind loses its oldest pending
//! frames, never accumulates backlog, and never slows the producer down.
//!
//! # Architecture
//!
//! ```text
//!   Producer ──► Dispatcher::publish(bytes)
//!                   │
//!                   ├──► LatestSlot::set ◄──── SamplingSession::get (poll)
//!                   │
//!                   └──► registry.snapshot()
//!                          │ per consumer: queue.offer (non-blocking,
//!                          │               drop-oldest on overflow)
//!          ┌───────────────┼───────────────┐
//!          ▼               ▼               ▼
//!     [Consumer]      [Consumer]      [Consumer]
//!     queue.take()    queue.take()    queue.take()
//!          │               │               │
//!          └─► DeliverySession ─► write_frame ─► TCP
//! ```
//!
//! # Zero-copy fan-out
//!
//! `bytes::Bytes` payloads are reference counted: fan-out to N consumers
//! clones the `Frame` handle but shares one payload allocation.

pub mod config;
pub mod consumer;
pub mod dispatcher;
pub mod error;
pub mod frame;
pub mod queue;
pub mod registry;
pub mod slot;

pub use config::RelayConfig;
pub use consumer::Consumer;
pub use dispatcher::Dispatcher;
pub use error::RegistryError;
pub use frame::{ConsumerId, Frame};
pub use queue::{FrameQueue, OfferOutcome};
pub use registry::ConsumerRegistry;
pub use slot::LatestSlot;
