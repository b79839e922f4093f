//! Framed TCP connection to a telemetry server

use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

use crate::error::{Error, Result};
use crate::protocol::{FrameReader, FrameWriter, Message};

use super::config::ClientConfig;

/// Low-level client connection: send and receive whole messages
pub struct Connector {
    reader: FrameReader<OwnedReadHalf>,
    writer: FrameWriter<OwnedWriteHalf>,
}

impl Connector {
    /// Open a TCP connection within `connect_timeout`
    pub async fn connect(config: &ClientConfig) -> Result<Self> {
        let socket = tokio::time::timeout(
            config.connect_timeout,
            TcpStream::connect(config.server_addr.as_str()),
        )
        .await
        .map_err(|_| Error::Timeout("connect"))??;

        socket.set_nodelay(true)?;
        tracing::debug!(server = %config.server_addr, "Connected");

        let (read_half, write_half) = socket.into_split();
        Ok(Self {
            reader: FrameReader::new(read_half, config.max_frame_size),
            writer: FrameWriter::new(write_half),
        })
    }

    /// Send one message
    pub async fn send(&mut self, msg: &Message) -> Result<()> {
        self.writer.write_message(msg).await
    }

    /// Receive the next message; `None` when the server closed the connection
    pub async fn recv(&mut self) -> Result<Option<Message>> {
        self.reader.read_message().await
    }

    /// Receive a reply to a call, mapping status frames to errors
    ///
    /// `Ok(None)` means the server closed the connection instead of answering.
    pub async fn recv_reply(&mut self) -> Result<Option<Message>> {
        match self.recv().await? {
            Some(Message::Status { code, message }) => Err(Error::Rejected { code, message }),
            other => Ok(other),
        }
    }
}
