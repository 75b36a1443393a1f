//! Consumer transport seam
//!
//! Sessions write frames through the [`FrameTransport`] trait rather than a
//! concrete socket, which keeps the eviction logic testable against mock
//! transports. The TCP implementation writes the length-prefixed wire form.

use std::future::Future;

use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedWriteHalf;

use crate::protocol::wire;
use crate::relay::Frame;

/// Write side of one consumer connection
pub trait FrameTransport: Send {
    /// Write one frame to the consumer
    fn write_frame(&mut self, frame: &Frame) -> impl Future<Output = std::io::Result<()>> + Send;

    /// Close the transport; best effort, errors are ignored
    fn close(&mut self) -> impl Future<Output = ()> + Send;
}

/// TCP transport writing length-prefixed frames
pub struct TcpFrameTransport {
    writer: OwnedWriteHalf,
}

impl TcpFrameTransport {
    /// Wrap the write half of an accepted connection
    pub fn new(writer: OwnedWriteHalf) -> Self {
        Self { writer }
    }
}

impl FrameTransport for TcpFrameTransport {
    async fn write_frame(&mut self, frame: &Frame) -> std::io::Result<()> {
        wire::write_frame(&mut self.writer, &frame.payload).await
    }

    async fn close(&mut self) {
        let _ = self.writer.shutdown().await;
    }
}
