//! Frame relay viewer client
//!
//! Receives frames from a relay server, either streamed (the server pushes
//! every frame it can, dropping the oldest when the viewer lags) or
//! sampled (the server sends the latest frame at its poll cadence, one
//! send per distinct frame).

use bytes::Bytes;
use tokio::net::TcpStream;

use crate::error::Result;
use crate::protocol::wire;

use super::config::ClientConfig;

/// How a viewer receives frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    /// Streamed delivery through a per-consumer queue
    Stream,
    /// Latest-slot sampling at the server's poll interval
    Sample,
}

/// Receives frames from a relay server
pub struct RelayViewer {
    stream: TcpStream,
    max_frame_size: usize,
    frames_received: u64,
}

impl RelayViewer {
    /// Connect to a relay server in the given mode
    pub async fn connect(config: ClientConfig, mode: ViewMode) -> Result<Self> {
        let mut stream = TcpStream::connect(&config.addr).await?;
        if config.tcp_nodelay {
            stream.set_nodelay(true)?;
        }

        let role = match mode {
            ViewMode::Stream => wire::ROLE_SUBSCRIBE,
            ViewMode::Sample => wire::ROLE_SAMPLE,
        };
        wire::write_role(&mut stream, role).await?;

        tracing::debug!(addr = %config.addr, ?mode, "Viewer connected");
        Ok(Self {
            stream,
            max_frame_size: config.max_frame_size,
            frames_received: 0,
        })
    }

    /// Receive the next frame
    ///
    /// Returns `Ok(None)` when the server closes the connection (clean
    /// disconnect or eviction).
    pub async fn next_frame(&mut self) -> Result<Option<Bytes>> {
        let frame = wire::read_frame(&mut self.stream, self.max_frame_size).await?;
        if frame.is_some() {
            self.frames_received += 1;
        }
        Ok(frame)
    }

    /// Frames received over this connection
    pub fn frames_received(&self) -> u64 {
        self.frames_received
    }
}
