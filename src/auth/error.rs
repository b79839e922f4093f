//! Authentication error types

use thiserror::Error;

/// Reason a call was rejected by the [`AuthGate`](super::AuthGate)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The call carried no metadata at all
    #[error("missing credentials")]
    MissingCredentials,
    /// Metadata was attached but had no authorization value
    #[error("empty credential")]
    EmptyCredential,
    /// The authorization value did not match the expected bearer token
    #[error("token mismatch")]
    TokenMismatch,
}
