//! Protocol messages

use bytes::Bytes;

use crate::auth::{AuthError, Metadata};
use crate::error::ProtocolError;
use crate::reading::Reading;

use super::constants::*;

/// Status code carried by a [`Message::Status`] frame
///
/// Values follow the gRPC status code numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    InvalidArgument = 3,
    Unavailable = 14,
    Unauthenticated = 16,
}

impl StatusCode {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(value: u8) -> Result<Self, ProtocolError> {
        match value {
            3 => Ok(StatusCode::InvalidArgument),
            14 => Ok(StatusCode::Unavailable),
            16 => Ok(StatusCode::Unauthenticated),
            other => Err(ProtocolError::UnknownStatusCode(other)),
        }
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StatusCode::InvalidArgument => "invalid argument",
            StatusCode::Unavailable => "unavailable",
            StatusCode::Unauthenticated => "unauthenticated",
        };
        f.write_str(name)
    }
}

/// A single protocol frame
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Producer call: publish one reading
    Push {
        metadata: Option<Metadata>,
        reading: Reading,
    },
    /// Consumer call: open a reading stream
    Subscribe {
        metadata: Option<Metadata>,
        /// Opaque filter, currently ignored by the server
        filter: Bytes,
    },
    /// Successful push, or subscription accepted
    Ack,
    /// One streamed reading
    Reading(Reading),
    /// Call failed; terminal for a subscription
    Status { code: StatusCode, message: String },
}

impl Message {
    /// Wire type byte
    pub fn type_id(&self) -> u8 {
        match self {
            Message::Push { .. } => MSG_PUSH,
            Message::Subscribe { .. } => MSG_SUBSCRIBE,
            Message::Ack => MSG_ACK,
            Message::Reading(_) => MSG_READING,
            Message::Status { .. } => MSG_STATUS,
        }
    }

    /// Short name for logs and errors
    pub fn name(&self) -> &'static str {
        match self {
            Message::Push { .. } => "push",
            Message::Subscribe { .. } => "subscribe",
            Message::Ack => "ack",
            Message::Reading(_) => "reading",
            Message::Status { .. } => "status",
        }
    }

    /// Status frame for a rejected credential
    pub fn unauthenticated(error: AuthError) -> Self {
        Message::Status {
            code: StatusCode::Unauthenticated,
            message: error.to_string(),
        }
    }

    /// Status frame for a connection the server will not serve right now
    pub fn unavailable(message: impl Into<String>) -> Self {
        Message::Status {
            code: StatusCode::Unavailable,
            message: message.into(),
        }
    }

    /// Status frame for a call the server cannot interpret
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Message::Status {
            code: StatusCode::InvalidArgument,
            message: message.into(),
        }
    }
}
