//! Relay clients
//!
//! Thin TCP clients for the two ends of the relay: [`RelayPublisher`]
//! feeds frames in, [`RelayViewer`] reads them back out (streamed or
//! sampled).

pub mod config;
pub mod publisher;
pub mod viewer;

pub use config::ClientConfig;
pub use publisher::RelayPublisher;
pub use viewer::{RelayViewer, ViewMode};
