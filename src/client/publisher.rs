//! Frame relay publisher client
//!
//! High-level API for feeding frames into a relay server over TCP. Where
//! the payload bytes come from (camera, screen capture, encoder) is the
//! caller's business; the publisher only moves opaque buffers.

use bytes::Bytes;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use crate::error::Result;
use crate::protocol::wire;

use super::config::ClientConfig;

/// Publishes frames to a relay server
///
/// # Example
/// ```no_run
/// use bytes::Bytes;
/// use framecast::client::{ClientConfig, RelayPublisher};
///
/// # async fn example() -> framecast::Result<()> {
/// let config = ClientConfig::new("127.0.0.1:9000");
/// let mut publisher = RelayPublisher::connect(config).await?;
///
/// publisher.send_frame(Bytes::from_static(b"encoded frame")).await?;
/// publisher.disconnect().await?;
/// # Ok(())
/// # }
/// ```
pub struct RelayPublisher {
    stream: TcpStream,
    frames_sent: u64,
}

impl RelayPublisher {
    /// Connect to a relay server as the publisher
    ///
    /// The server admits one active publisher at a time; a second
    /// connection is closed by the server.
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        let mut stream = TcpStream::connect(&config.addr).await?;
        if config.tcp_nodelay {
            stream.set_nodelay(true)?;
        }
        wire::write_role(&mut stream, wire::ROLE_PUBLISH).await?;

        tracing::debug!(addr = %config.addr, "Publisher connected");
        Ok(Self {
            stream,
            frames_sent: 0,
        })
    }

    /// Send one frame
    pub async fn send_frame(&mut self, payload: Bytes) -> Result<()> {
        wire::write_frame(&mut self.stream, &payload).await?;
        self.frames_sent += 1;
        Ok(())
    }

    /// Frames sent over this connection
    pub fn frames_sent(&self) -> u64 {
        self.frames_sent
    }

    /// Shut the connection down cleanly
    pub async fn disconnect(mut self) -> Result<()> {
        self.stream.shutdown().await?;
        Ok(())
    }
}
