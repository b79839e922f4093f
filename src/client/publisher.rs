//! Reading publisher
//!
//! High-level API for pushing readings to a telemetry server.

use crate::error::{Error, ProtocolError, Result};
use crate::protocol::Message;
use crate::reading::Reading;
use crate::session::TransportError;

use super::config::ClientConfig;
use super::connector::Connector;

/// Pushes readings to a telemetry server
///
/// Connects lazily on the first push. Any failure drops the connection, so
/// the next push starts from a fresh one; the publisher itself never retries.
///
/// # Example
/// ```no_run
/// use telemetry_hub::client::{ClientConfig, ReadingPublisher};
/// use telemetry_hub::Reading;
///
/// # async fn example() -> telemetry_hub::Result<()> {
/// let config = ClientConfig::new("localhost:50051").auth_token("secret");
/// let mut publisher = ReadingPublisher::new(config);
///
/// publisher.push(Reading::now(20.4)).await?;
/// # Ok(())
/// # }
/// ```
pub struct ReadingPublisher {
    config: ClientConfig,
    connector: Option<Connector>,
}

impl ReadingPublisher {
    /// Create a publisher. No connection is made until the first push.
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            connector: None,
        }
    }

    /// Connect now instead of on the first push
    pub async fn connect(&mut self) -> Result<()> {
        if self.connector.is_none() {
            self.connector = Some(Connector::connect(&self.config).await?);
        }
        Ok(())
    }

    /// Push one reading and wait for the server's acknowledgement
    ///
    /// Fails with [`Error::Rejected`] if the server refuses the credential
    /// and with [`Error::Timeout`] if no answer arrives within
    /// `request_timeout`.
    pub async fn push(&mut self, reading: Reading) -> Result<()> {
        let result = self.try_push(reading).await;
        if result.is_err() {
            self.connector = None;
        }
        result
    }

    async fn try_push(&mut self, reading: Reading) -> Result<()> {
        self.connect().await?;
        let metadata = self.config.metadata();
        let timeout = self.config.request_timeout;
        let connector = self
            .connector
            .as_mut()
            .ok_or(Error::Transport(TransportError::Closed))?;

        let call = exchange(connector, Message::Push { metadata, reading });
        tokio::time::timeout(timeout, call)
            .await
            .map_err(|_| Error::Timeout("push acknowledgement"))?
    }

    /// Disconnect from the server
    pub fn disconnect(&mut self) {
        self.connector.take();
    }

    /// Check if currently connected
    pub fn is_connected(&self) -> bool {
        self.connector.is_some()
    }
}

async fn exchange(connector: &mut Connector, push: Message) -> Result<()> {
    connector.send(&push).await?;
    match connector.recv_reply().await? {
        Some(Message::Ack) => Ok(()),
        Some(other) => Err(ProtocolError::UnexpectedMessage(other.name().to_string()).into()),
        None => Err(Error::Transport(TransportError::Closed)),
    }
}
