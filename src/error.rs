//! Error types for telemetry-hub

use thiserror::Error;

use crate::auth::AuthError;
use crate::protocol::StatusCode;
use crate::session::TransportError;

/// Result type for crate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The remote side answered with a non-OK status
    #[error("rejected by server ({code}): {message}")]
    Rejected { code: StatusCode, message: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("timed out waiting for {0}")]
    Timeout(&'static str),
}

/// Wire protocol errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Declared payload length exceeds the configured maximum
    #[error("frame of {size} bytes exceeds limit of {max}")]
    FrameTooLarge { size: usize, max: usize },

    #[error("unknown message type 0x{0:02x}")]
    UnknownMessageType(u8),

    #[error("unknown status code {0}")]
    UnknownStatusCode(u8),

    /// Payload shorter or longer than its message type requires
    #[error("malformed {0} message")]
    Malformed(&'static str),

    #[error("invalid UTF-8 in {0}")]
    InvalidUtf8(&'static str),

    /// Connection closed in the middle of a frame
    #[error("connection closed mid-frame")]
    Truncated,

    #[error("unexpected message: {0}")]
    UnexpectedMessage(String),
}
