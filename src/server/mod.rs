//! Relay server
//!
//! TCP front end for the relay core: accept loop, role dispatch, and the
//! consumer transport seam.

pub mod config;
pub mod listener;
pub mod transport;

pub use config::ServerConfig;
pub use listener::RelayServer;
pub use transport::{FrameTransport, TcpFrameTransport};
