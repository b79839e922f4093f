//! Outbound transport seam for stream sessions

use std::future::Future;

use thiserror::Error;

use crate::reading::Reading;

/// Failure writing to a subscriber's transport
#[derive(Debug, Error)]
pub enum TransportError {
    /// The peer is gone
    #[error("transport closed")]
    Closed,
    /// Write failed
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Where a [`StreamSession`](super::StreamSession) delivers readings
///
/// Implemented by the TCP connection handler in the server; tests plug in
/// in-memory sinks.
pub trait ReadingSink: Send {
    /// Called once the session is registered and will receive readings
    fn opened(&mut self) -> impl Future<Output = Result<(), TransportError>> + Send {
        async { Ok(()) }
    }

    /// Forward one reading to the subscriber
    fn send(&mut self, reading: Reading) -> impl Future<Output = Result<(), TransportError>> + Send;
}
