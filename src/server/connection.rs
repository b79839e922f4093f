//! Per-connection call handling
//!
//! The first frame on a connection decides its role: a `Push` makes it a
//! producer connection carrying any number of unary pushes, a `Subscribe`
//! makes it a long-lived reading stream.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::auth::Metadata;
use crate::error::{Error, ProtocolError, Result};
use crate::hub::BroadcastHub;
use crate::protocol::{FrameReader, FrameWriter, Message};
use crate::reading::Reading;
use crate::server::config::ServerConfig;
use crate::session::{ReadingSink, TransportError};

/// A single client connection
pub(crate) struct Connection {
    session_id: u64,
    peer_addr: SocketAddr,
    reader: FrameReader<OwnedReadHalf>,
    writer: FrameWriter<OwnedWriteHalf>,
    config: ServerConfig,
    hub: Arc<BroadcastHub>,
    shutdown: CancellationToken,
}

impl Connection {
    pub(crate) fn new(
        session_id: u64,
        socket: TcpStream,
        peer_addr: SocketAddr,
        config: ServerConfig,
        hub: Arc<BroadcastHub>,
        shutdown: CancellationToken,
    ) -> Self {
        let (read_half, write_half) = socket.into_split();

        Self {
            session_id,
            peer_addr,
            reader: FrameReader::new(read_half, config.max_frame_size),
            writer: FrameWriter::new(write_half),
            config,
            hub,
            shutdown,
        }
    }

    /// Serve the connection until the peer leaves or the server shuts down
    pub(crate) async fn run(mut self) -> Result<()> {
        let first = tokio::select! {
            _ = self.shutdown.cancelled() => return Ok(()),
            first = tokio::time::timeout(self.config.connection_timeout, self.reader.read_message()) => {
                first.map_err(|_| Error::Timeout("first call"))??
            }
        };

        match first {
            None => Ok(()),
            Some(Message::Push { metadata, reading }) => self.serve_pushes(metadata, reading).await,
            Some(Message::Subscribe { metadata, filter }) => self.serve_stream(metadata, filter).await,
            Some(other) => self.reject_unexpected(&other).await,
        }
    }

    async fn serve_pushes(mut self, mut metadata: Option<Metadata>, mut reading: Reading) -> Result<()> {
        loop {
            let response = match self.hub.publish(metadata.as_ref(), reading) {
                Ok(delivery) => {
                    tracing::trace!(
                        session_id = self.session_id,
                        value = reading.value,
                        subscribers = delivery.attempted,
                        "Reading published"
                    );
                    Message::Ack
                }
                Err(e) => {
                    tracing::warn!(
                        session_id = self.session_id,
                        peer = %self.peer_addr,
                        error = %e,
                        "Push rejected"
                    );
                    Message::unauthenticated(e)
                }
            };
            self.writer.write_message(&response).await?;

            let next = tokio::select! {
                _ = self.shutdown.cancelled() => return Ok(()),
                next = self.reader.read_message() => next?,
            };

            match next {
                None => return Ok(()),
                Some(Message::Push {
                    metadata: next_metadata,
                    reading: next_reading,
                }) => {
                    metadata = next_metadata;
                    reading = next_reading;
                }
                Some(other) => return self.reject_unexpected(&other).await,
            }
        }
    }

    async fn serve_stream(self, metadata: Option<Metadata>, filter: Bytes) -> Result<()> {
        let Connection {
            session_id,
            peer_addr,
            reader,
            writer,
            config,
            hub,
            shutdown,
        } = self;
        let mut sink = FrameSink { writer };

        let session = match hub.open_session(metadata.as_ref()) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(
                    session_id = session_id,
                    peer = %peer_addr,
                    error = %e,
                    "Subscription rejected"
                );
                sink.writer.write_message(&Message::unauthenticated(e)).await?;
                return Ok(());
            }
        };

        tracing::debug!(
            session_id = session_id,
            peer = %peer_addr,
            filter_len = filter.len(),
            "Subscription accepted"
        );

        let (cancel, watcher) = watch_consumer(reader, shutdown, config.drain_timeout);
        let result = session.run(&mut sink, cancel).await;
        watcher.abort();
        let _ = sink.writer.shutdown().await;

        let outcome = result?;
        tracing::debug!(
            session_id = session_id,
            end = ?outcome.end,
            delivered = outcome.delivered,
            "Subscription ended"
        );

        Ok(())
    }

    async fn reject_unexpected(mut self, msg: &Message) -> Result<()> {
        let reply = Message::invalid_argument(format!("unexpected {} message", msg.name()));
        self.writer.write_message(&reply).await?;
        Err(ProtocolError::UnexpectedMessage(msg.name().to_string()).into())
    }
}

/// Cancel a stream session once its consumer goes away
///
/// Consumers send nothing after `Subscribe`, so end of input (including a
/// half-close of the consumer's write side) or a read error means the
/// consumer has left. Server shutdown does not cancel directly: it closes
/// the session's queue, which is drained first. Only a session still
/// running `drain_timeout` after shutdown is cancelled.
pub(crate) fn watch_consumer<R>(
    mut reader: FrameReader<R>,
    shutdown: CancellationToken,
    drain_timeout: Duration,
) -> (CancellationToken, JoinHandle<()>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let cancel = CancellationToken::new();
    let watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = async { while let Ok(Some(_)) = reader.read_message().await {} } => {}
                _ = async {
                    shutdown.cancelled().await;
                    tokio::time::sleep(drain_timeout).await;
                } => {
                    tracing::debug!("Drain timeout elapsed, cancelling stream");
                }
            }
            cancel.cancel();
        })
    };
    (cancel, watcher)
}

/// Writes a session's readings as protocol frames
pub(crate) struct FrameSink<W> {
    writer: FrameWriter<W>,
}

impl<W: AsyncWrite + Unpin + Send> FrameSink<W> {
    async fn write(&mut self, msg: &Message) -> std::result::Result<(), TransportError> {
        self.writer.write_message(msg).await.map_err(|e| match e {
            Error::Io(io) => TransportError::Io(io),
            _ => TransportError::Closed,
        })
    }
}

impl<W: AsyncWrite + Unpin + Send> ReadingSink for FrameSink<W> {
    async fn opened(&mut self) -> std::result::Result<(), TransportError> {
        self.write(&Message::Ack).await
    }

    async fn send(&mut self, reading: Reading) -> std::result::Result<(), TransportError> {
        self.write(&Message::Reading(reading)).await
    }
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;
    use tokio_test::io::Builder;

    use super::*;
    use crate::protocol::codec;
    use crate::reading::Timestamp;

    fn frame(msg: &Message) -> Vec<u8> {
        let mut buf = BytesMut::new();
        codec::encode(msg, &mut buf).unwrap();
        buf.to_vec()
    }

    #[tokio::test]
    async fn test_frame_sink_writes_ack_then_readings() {
        let reading = Reading::new(21.75, Timestamp::new(1_700_000_000, 0));
        let mock = Builder::new()
            .write(&frame(&Message::Ack))
            .write(&frame(&Message::Reading(reading)))
            .build();
        let mut sink = FrameSink {
            writer: FrameWriter::new(mock),
        };

        sink.opened().await.unwrap();
        sink.send(reading).await.unwrap();
    }

    #[tokio::test]
    async fn test_frame_sink_maps_io_errors() {
        let mock = Builder::new()
            .write_error(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset"))
            .build();
        let mut sink = FrameSink {
            writer: FrameWriter::new(mock),
        };

        let err = sink
            .send(Reading::new(1.0, Timestamp::default()))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Io(ref e) if e.kind() == std::io::ErrorKind::ConnectionReset));
    }

    #[tokio::test]
    async fn test_watch_consumer_cancels_on_end_of_input() {
        let (client, server) = tokio::io::duplex(64);
        let reader = FrameReader::new(server, 1024);
        let (cancel, _watcher) =
            watch_consumer(reader, CancellationToken::new(), Duration::from_secs(60));

        drop(client);

        tokio::time::timeout(Duration::from_secs(5), cancel.cancelled())
            .await
            .expect("consumer leaving should cancel the stream");
    }

    #[tokio::test]
    async fn test_watch_consumer_waits_for_drain_after_shutdown() {
        let (_client, server) = tokio::io::duplex(64);
        let reader = FrameReader::new(server, 1024);
        let shutdown = CancellationToken::new();
        let (cancel, _watcher) =
            watch_consumer(reader, shutdown.clone(), Duration::from_millis(200));

        shutdown.cancel();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!cancel.is_cancelled());

        tokio::time::timeout(Duration::from_secs(5), cancel.cancelled())
            .await
            .expect("stream should be cancelled once the drain timeout elapses");
    }
}
