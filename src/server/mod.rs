//! Telemetry server
//!
//! Accepts TCP connections and maps each call onto the broadcast hub.

pub mod config;
mod connection;
pub mod listener;

pub use config::ServerConfig;
pub use listener::TelemetryServer;
