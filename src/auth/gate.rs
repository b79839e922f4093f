//! Shared-secret bearer gate

use super::error::AuthError;
use super::metadata::Metadata;
use crate::protocol::constants::BEARER_PREFIX;

/// Validates the bearer credential carried in call metadata
///
/// Holds only the expected `authorization` value; evaluation has no side
/// effects, so one gate can be shared freely between tasks.
#[derive(Clone)]
pub struct AuthGate {
    expected: String,
}

impl AuthGate {
    /// Create a gate accepting `Bearer <secret>`
    pub fn new(secret: impl AsRef<str>) -> Self {
        Self {
            expected: format!("{}{}", BEARER_PREFIX, secret.as_ref()),
        }
    }

    /// Check the credential attached to a call
    ///
    /// Only the first `authorization` value is considered.
    pub fn authenticate(&self, metadata: Option<&Metadata>) -> Result<(), AuthError> {
        let metadata = metadata.ok_or(AuthError::MissingCredentials)?;

        let credential = match metadata.authorization() {
            Some(value) if !value.is_empty() => value,
            _ => return Err(AuthError::EmptyCredential),
        };

        if credential != self.expected {
            return Err(AuthError::TokenMismatch);
        }

        Ok(())
    }
}

impl std::fmt::Debug for AuthGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthGate")
            .field("expected", &"<redacted>")
            .finish()
    }
}
