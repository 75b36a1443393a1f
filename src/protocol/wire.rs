//! Wire format
//!
//! The transport protocol is deliberately minimal. A connection opens with
//! a single role byte selecting what it is, then carries length-prefixed
//! opaque frames in one direction:
//!
//! ```text
//! connection:  [role: 1 byte] [frame] [frame] ...
//! frame:       [length: u32 big-endian] [payload: `length` bytes]
//! ```
//!
//! Publishers send frames to the server; subscribe and sample connections
//! receive them. Frame contents are never inspected.

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{Error, Result, WireError};

/// Role byte: remote producer feeding the dispatcher
pub const ROLE_PUBLISH: u8 = 0x01;
/// Role byte: streamed consumer (queue + delivery session)
pub const ROLE_SUBSCRIBE: u8 = 0x02;
/// Role byte: pull-style consumer (latest-slot polling)
pub const ROLE_SAMPLE: u8 = 0x03;

/// Write one length-prefixed frame and flush
///
/// Fails without writing anything if the payload does not fit the u32
/// length prefix.
pub async fn write_frame<W>(writer: &mut W, payload: &[u8]) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_u32(length_prefix(payload.len())?).await?;
    writer.write_all(payload).await?;
    writer.flush().await
}

fn length_prefix(len: usize) -> std::io::Result<u32> {
    u32::try_from(len).map_err(|_| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("frame payload of {} bytes exceeds the u32 length prefix", len),
        )
    })
}

/// Read one length-prefixed frame
///
/// Returns `Ok(None)` on a clean disconnect (EOF at a frame boundary). A
/// declared length above `max_frame_size` is a wire violation and fatal
/// for the connection.
pub async fn read_frame<R>(reader: &mut R, max_frame_size: usize) -> Result<Option<Bytes>>
where
    R: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }

    let len = u32::from_be_bytes(len_buf) as usize;
    if len > max_frame_size {
        return Err(Error::Wire(WireError::FrameTooLarge {
            size: len,
            max: max_frame_size,
        }));
    }

    let mut payload = BytesMut::zeroed(len);
    reader.read_exact(&mut payload).await?;
    Ok(Some(payload.freeze()))
}

/// Write the opening role byte
pub async fn write_role<W>(writer: &mut W, role: u8) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_u8(role).await?;
    writer.flush().await
}

/// Read and validate the opening role byte
pub async fn read_role<R>(reader: &mut R) -> Result<u8>
where
    R: AsyncRead + Unpin,
{
    let role = reader.read_u8().await?;
    match role {
        ROLE_PUBLISH | ROLE_SUBSCRIBE | ROLE_SAMPLE => Ok(role),
        other => Err(Error::Wire(WireError::UnknownRole(other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_MAX: usize = 1024;

    #[tokio::test]
    async fn test_frame_round_trip() {
        let (mut client, mut server) = tokio::io::duplex(256);

        write_frame(&mut client, b"hello frame").await.unwrap();

        let payload = read_frame(&mut server, TEST_MAX).await.unwrap().unwrap();
        assert_eq!(&payload[..], b"hello frame");
    }

    #[tokio::test]
    async fn test_empty_frame() {
        let (mut client, mut server) = tokio::io::duplex(256);

        write_frame(&mut client, b"").await.unwrap();

        let payload = read_frame(&mut server, TEST_MAX).await.unwrap().unwrap();
        assert!(payload.is_empty());
    }

    #[tokio::test]
    async fn test_clean_eof_is_none() {
        let (client, mut server) = tokio::io::duplex(256);
        drop(client);

        assert!(read_frame(&mut server, TEST_MAX).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_oversized_frame_rejected() {
        let (mut client, mut server) = tokio::io::duplex(256);

        // Declare a length above the limit, send no payload
        tokio::io::AsyncWriteExt::write_u32(&mut client, 2048)
            .await
            .unwrap();

        let result = read_frame(&mut server, TEST_MAX).await;
        assert!(matches!(
            result,
            Err(Error::Wire(WireError::FrameTooLarge { size: 2048, .. }))
        ));
    }

    #[test]
    fn test_length_prefix_rejects_oversized_payload() {
        assert_eq!(length_prefix(0).unwrap(), 0);
        assert_eq!(length_prefix(1024).unwrap(), 1024);
        assert_eq!(length_prefix(u32::MAX as usize).unwrap(), u32::MAX);

        let err = length_prefix(u32::MAX as usize + 1).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn test_role_round_trip() {
        let (mut client, mut server) = tokio::io::duplex(16);

        write_role(&mut client, ROLE_SUBSCRIBE).await.unwrap();
        assert_eq!(read_role(&mut server).await.unwrap(), ROLE_SUBSCRIBE);
    }

    #[tokio::test]
    async fn test_unknown_role_rejected() {
        let (mut client, mut server) = tokio::io::duplex(16);

        write_role(&mut client, 0x42).await.unwrap();

        let result = read_role(&mut server).await;
        assert!(matches!(
            result,
            Err(Error::Wire(WireError::UnknownRole(0x42)))
        ));
    }
}
