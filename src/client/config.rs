//! Client configuration

use std::time::Duration;

use crate::auth::Metadata;
use crate::protocol::constants::{DEFAULT_MAX_FRAME_SIZE, DEFAULT_PORT};
use crate::server::config::{ENV_AUTH_TOKEN, ENV_SERVER_ADDRESS};

/// Connection settings shared by publishers and subscribers
#[derive(Clone)]
pub struct ClientConfig {
    /// `host:port` of the server
    pub server_addr: String,

    /// Shared secret; when `None` calls carry no metadata at all
    pub auth_token: Option<String>,

    /// TCP connect timeout
    pub connect_timeout: Duration,

    /// How long a push waits for its acknowledgement
    pub request_timeout: Duration,

    /// Largest accepted frame payload
    pub max_frame_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_addr: format!("localhost:{}", DEFAULT_PORT),
            auth_token: None,
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(1),
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}

impl ClientConfig {
    /// Create a config for the given server address
    pub fn new(server_addr: impl Into<String>) -> Self {
        Self {
            server_addr: server_addr.into(),
            ..Default::default()
        }
    }

    /// Read `SERVER_ADDRESS` and `AUTH_TOKEN` from the environment
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(addr) = std::env::var(ENV_SERVER_ADDRESS) {
            config.server_addr = addr;
        }
        config.auth_token = std::env::var(ENV_AUTH_TOKEN).ok();
        config
    }

    /// Set the shared secret
    pub fn auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Set connect timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Metadata to attach to each call
    pub fn metadata(&self) -> Option<Metadata> {
        self.auth_token.as_deref().map(Metadata::bearer)
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("server_addr", &self.server_addr)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<redacted>"))
            .field("connect_timeout", &self.connect_timeout)
            .field("request_timeout", &self.request_timeout)
            .field("max_frame_size", &self.max_frame_size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.server_addr, "localhost:50051");
        assert_eq!(config.request_timeout, Duration::from_secs(1));
        assert!(config.metadata().is_none());
    }

    #[test]
    fn test_metadata_carries_bearer() {
        let config = ClientConfig::new("127.0.0.1:1").auth_token("abc");
        let metadata = config.metadata().unwrap();

        assert_eq!(metadata.authorization(), Some("Bearer abc"));
        assert!(!format!("{:?}", config).contains("abc"));
    }
}
