//! Server configuration

use std::net::SocketAddr;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::protocol::constants::*;

/// Environment variable holding the listen address
pub const ENV_SERVER_ADDRESS: &str = "SERVER_ADDRESS";
/// Environment variable holding the shared secret
pub const ENV_AUTH_TOKEN: &str = "AUTH_TOKEN";
/// Environment variable overriding the per-subscriber queue capacity
pub const ENV_QUEUE_CAPACITY: &str = "QUEUE_CAPACITY";
/// Environment variable limiting concurrent connections
pub const ENV_MAX_CONNECTIONS: &str = "MAX_CONNECTIONS";

/// Server configuration options
#[derive(Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_addr: SocketAddr,

    /// Shared secret expected as `authorization: Bearer <auth_token>`
    pub auth_token: String,

    /// Capacity of each subscriber's delivery queue
    pub queue_capacity: usize,

    /// Maximum concurrent connections (0 = unlimited)
    pub max_connections: usize,

    /// The first call must arrive within this time
    pub connection_timeout: Duration,

    /// How long open streams may keep draining after shutdown
    pub drain_timeout: Duration,

    /// Largest accepted frame payload
    pub max_frame_size: usize,

    /// Enable TCP_NODELAY (disable Nagle's algorithm)
    pub tcp_nodelay: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            auth_token: String::new(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            max_connections: 0, // Unlimited
            connection_timeout: Duration::from_secs(10),
            drain_timeout: Duration::from_secs(5),
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            tcp_nodelay: true, // Readings are tiny; don't batch them
        }
    }
}

impl ServerConfig {
    /// Create a new config with custom bind address
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            bind_addr: addr,
            ..Default::default()
        }
    }

    /// Load from the process environment
    ///
    /// `AUTH_TOKEN` is required; `SERVER_ADDRESS`, `QUEUE_CAPACITY` and
    /// `MAX_CONNECTIONS` fall back to the defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = lookup(ENV_SERVER_ADDRESS) {
            config.bind_addr = addr.trim().parse().map_err(|e| {
                Error::Config(format!("{}={:?} is not a socket address: {}", ENV_SERVER_ADDRESS, addr, e))
            })?;
        }

        config.auth_token = lookup(ENV_AUTH_TOKEN)
            .ok_or_else(|| Error::Config(format!("{} is not set", ENV_AUTH_TOKEN)))?;

        if let Some(capacity) = lookup(ENV_QUEUE_CAPACITY) {
            config = config.queue_capacity(parse_number(ENV_QUEUE_CAPACITY, &capacity)?);
        }

        if let Some(max) = lookup(ENV_MAX_CONNECTIONS) {
            config.max_connections = parse_number(ENV_MAX_CONNECTIONS, &max)?;
        }

        Ok(config)
    }

    /// Set the bind address
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Set the shared secret
    pub fn auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = token.into();
        self
    }

    /// Set the per-subscriber queue capacity (at least 1)
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    /// Set maximum connections
    pub fn max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }

    /// Set connection timeout
    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Set how long streams may drain after shutdown
    pub fn drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = timeout;
        self
    }

    /// Set the largest accepted frame payload
    pub fn max_frame_size(mut self, size: usize) -> Self {
        self.max_frame_size = size;
        self
    }
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("bind_addr", &self.bind_addr)
            .field("auth_token", &"<redacted>")
            .field("queue_capacity", &self.queue_capacity)
            .field("max_connections", &self.max_connections)
            .field("connection_timeout", &self.connection_timeout)
            .field("drain_timeout", &self.drain_timeout)
            .field("max_frame_size", &self.max_frame_size)
            .field("tcp_nodelay", &self.tcp_nodelay)
            .finish()
    }
}

fn parse_number(key: &str, value: &str) -> Result<usize> {
    value
        .trim()
        .parse()
        .map_err(|e| Error::Config(format!("{}={:?} is not a number: {}", key, value, e)))
}
