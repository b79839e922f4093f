//! Hub error types

use thiserror::Error;

use crate::auth::AuthError;
use crate::session::TransportError;

/// Terminal error of a streaming subscription
#[derive(Debug, Error)]
pub enum StreamError {
    /// Rejected before registration
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),
    /// The subscriber's transport failed during delivery
    #[error(transparent)]
    Transport(#[from] TransportError),
}
