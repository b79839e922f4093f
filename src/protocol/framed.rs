//! Async frame I/O over any byte stream

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{ProtocolError, Result};

use super::codec;
use super::message::Message;

/// Reads whole messages from an `AsyncRead`
pub struct FrameReader<R> {
    inner: R,
    buf: BytesMut,
    max_frame_size: usize,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    pub fn new(inner: R, max_frame_size: usize) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(4 * 1024),
            max_frame_size,
        }
    }

    /// Read the next message
    ///
    /// Returns `Ok(None)` on a clean end of stream between frames; EOF
    /// inside a frame is [`ProtocolError::Truncated`].
    pub async fn read_message(&mut self) -> Result<Option<Message>> {
        loop {
            if let Some(msg) = codec::decode(&mut self.buf, self.max_frame_size)? {
                return Ok(Some(msg));
            }

            if self.inner.read_buf(&mut self.buf).await? == 0 {
                if self.buf.is_empty() {
                    return Ok(None);
                }
                return Err(ProtocolError::Truncated.into());
            }
        }
    }
}

/// Writes whole messages to an `AsyncWrite`, flushing after each one
pub struct FrameWriter<W> {
    inner: W,
    buf: BytesMut,
}

impl<W: AsyncWrite + Unpin> FrameWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(256),
        }
    }

    /// Encode and write one message
    pub async fn write_message(&mut self, msg: &Message) -> Result<()> {
        self.buf.clear();
        codec::encode(msg, &mut self.buf)?;
        self.inner.write_all(&self.buf).await?;
        self.inner.flush().await?;
        Ok(())
    }

    /// Shut down the write side
    pub async fn shutdown(&mut self) -> Result<()> {
        self.inner.shutdown().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tokio_test::io::Builder;

    use super::*;
    use crate::error::Error;
    use crate::protocol::constants::DEFAULT_MAX_FRAME_SIZE;
    use crate::reading::{Reading, Timestamp};

    fn frame(msg: &Message) -> Vec<u8> {
        let mut buf = BytesMut::new();
        codec::encode(msg, &mut buf).unwrap();
        buf.to_vec()
    }

    #[tokio::test]
    async fn test_read_across_chunks() {
        let reading = Message::Reading(Reading::new(1.5, Timestamp::new(10, 0)));
        let bytes = frame(&reading);
        let (head, tail) = bytes.split_at(7);

        let mock = Builder::new().read(head).read(tail).read(&frame(&Message::Ack)).build();
        let mut reader = FrameReader::new(mock, DEFAULT_MAX_FRAME_SIZE);

        assert_eq!(reader.read_message().await.unwrap(), Some(reading));
        assert_eq!(reader.read_message().await.unwrap(), Some(Message::Ack));
        assert_eq!(reader.read_message().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_eof_mid_frame() {
        let bytes = frame(&Message::Ack);
        let mock = Builder::new().read(&bytes[..3]).build();
        let mut reader = FrameReader::new(mock, DEFAULT_MAX_FRAME_SIZE);

        let err = reader.read_message().await.unwrap_err();
        assert!(matches!(err, Error::Protocol(ProtocolError::Truncated)));
    }

    #[tokio::test]
    async fn test_write_message() {
        let msg = Message::invalid_argument("expected push or subscribe");
        let mock = Builder::new().write(&frame(&msg)).build();
        let mut writer = FrameWriter::new(mock);

        writer.write_message(&msg).await.unwrap();
    }

    #[tokio::test]
    async fn test_write_error_surfaces() {
        let mock = Builder::new()
            .write_error(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone"))
            .build();
        let mut writer = FrameWriter::new(mock);

        let err = writer.write_message(&Message::Ack).await.unwrap_err();
        assert!(matches!(err, Error::Io(ref e) if e.kind() == std::io::ErrorKind::BrokenPipe));
    }
}
