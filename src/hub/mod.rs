//! Broadcast hub
//!
//! The entry point for both RPC calls: [`BroadcastHub::publish`] for
//! producers and [`BroadcastHub::stream_readings`] for consumers. Both pass
//! the [`AuthGate`](crate::auth::AuthGate) before touching the registry.

pub mod broadcast;
pub mod error;

pub use broadcast::{BroadcastHub, Delivery};
pub use error::StreamError;
