//! framecast — one-to-many live frame relay
//!
//! One producer publishes opaque binary frames (encoded video, sensor
//! snapshots, anything); any number of network consumers receive them,
//! each at its own pace. The relay favors **freshness over completeness**:
//! a consumer that falls behind loses old frames instead of accumulating
//! backlog, and a stalled consumer is evicted instead of slowing anyone
//! else down. The producer never blocks, no matter how many consumers are
//! attached or how slow they are.
//!
//! # Quick start
//!
//! ```no_run
//! use framecast::{RelayServer, ServerConfig};
//!
//! # async fn example() -> framecast::Result<()> {
//! let config = ServerConfig::default().queue_capacity(4);
//! let server = RelayServer::new(config);
//! server.run().await
//! # }
//! ```
//!
//! In-process producers call [`Dispatcher::publish`] directly; remote ones
//! connect with [`client::RelayPublisher`]. Consumers either stream
//! (per-consumer bounded queue, drop-oldest on overflow) or sample (poll
//! the latest frame at a fixed rate).

pub mod client;
pub mod error;
pub mod protocol;
pub mod relay;
pub mod server;
pub mod session;
pub mod stats;

pub use error::{Error, Result};
pub use relay::{ConsumerId, ConsumerRegistry, Dispatcher, Frame, LatestSlot, RelayConfig};
pub use server::{RelayServer, ServerConfig};
pub use stats::{RelayStats, RelayStatsSnapshot};
