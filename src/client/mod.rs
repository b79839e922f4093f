//! Telemetry client implementation
//!
//! Provides client-side helpers for:
//! - Pushing readings from a sensor ([`ReadingPublisher`])
//! - Following the live reading stream ([`ReadingSubscriber`])
//! - Keeping a display window of recent readings ([`ReadingWindow`])

pub mod config;
pub mod connector;
pub mod publisher;
pub mod subscriber;
pub mod window;

pub use config::ClientConfig;
pub use connector::Connector;
pub use publisher::ReadingPublisher;
pub use subscriber::ReadingSubscriber;
pub use window::ReadingWindow;
