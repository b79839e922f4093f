//! Reading subscriber
//!
//! Opens a reading stream and yields readings as the server forwards them.

use bytes::Bytes;

use crate::error::{Error, ProtocolError, Result};
use crate::protocol::Message;
use crate::reading::Reading;
use crate::session::TransportError;

use super::config::ClientConfig;
use super::connector::Connector;

/// A live subscription to a telemetry server
///
/// Readings published after [`subscribe`](Self::subscribe) returns are
/// delivered unless this subscriber falls more than the server's queue
/// capacity behind, in which case newer readings are dropped until it
/// catches up.
pub struct ReadingSubscriber {
    connector: Connector,
    received: u64,
}

impl ReadingSubscriber {
    /// Connect, subscribe and wait until the server has registered us
    pub async fn subscribe(config: &ClientConfig, filter: Bytes) -> Result<Self> {
        let mut connector = Connector::connect(config).await?;
        connector
            .send(&Message::Subscribe {
                metadata: config.metadata(),
                filter,
            })
            .await?;

        let reply = tokio::time::timeout(config.request_timeout, connector.recv_reply())
            .await
            .map_err(|_| Error::Timeout("subscription acknowledgement"))??;

        match reply {
            Some(Message::Ack) => {
                tracing::debug!(server = %config.server_addr, "Subscribed");
                Ok(Self {
                    connector,
                    received: 0,
                })
            }
            Some(other) => Err(ProtocolError::UnexpectedMessage(other.name().to_string()).into()),
            None => Err(Error::Transport(TransportError::Closed)),
        }
    }

    /// Wait for the next reading
    ///
    /// `Ok(None)` when the server ended the stream (e.g. on shutdown).
    pub async fn next(&mut self) -> Result<Option<Reading>> {
        match self.connector.recv_reply().await? {
            Some(Message::Reading(reading)) => {
                self.received += 1;
                Ok(Some(reading))
            }
            Some(other) => Err(ProtocolError::UnexpectedMessage(other.name().to_string()).into()),
            None => Ok(None),
        }
    }

    /// Readings received so far
    pub fn received(&self) -> u64 {
        self.received
    }
}
