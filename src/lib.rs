//! # telemetry-hub
//!
//! Authenticated best-effort fan-out of scalar telemetry readings.
//!
//! Producers push [`Reading`]s; any number of consumers hold a long-lived
//! subscription and receive every reading published while their delivery
//! queue has room. A slow consumer loses readings instead of slowing anyone
//! down.
//!
//! ```text
//!  sensor ──Push──►┐                         ┌──► StreamSession ──► monitor
//!                  │  AuthGate               │
//!  sensor ──Push──►├──────────► BroadcastHub ┼──► StreamSession ──► monitor
//!                  │           (try_push to  │
//!                  │            each queue)  └──► StreamSession ──► monitor
//! ```
//!
//! The core lives in [`auth`], [`registry`], [`hub`] and [`session`]. The
//! [`server`] and [`client`] modules carry it over TCP using the framing in
//! [`protocol`].
//!
//! ## Example
//! ```no_run
//! use telemetry_hub::{ServerConfig, TelemetryServer};
//!
//! # async fn example() -> telemetry_hub::Result<()> {
//! let config = ServerConfig::from_env()?;
//! let server = TelemetryServer::new(config);
//! server.run_until(async { let _ = tokio::signal::ctrl_c().await; }).await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod hub;
pub mod protocol;
pub mod reading;
pub mod registry;
pub mod sensor;
pub mod server;
pub mod session;
pub mod stats;

pub use auth::{AuthError, AuthGate, Metadata};
pub use error::{Error, Result};
pub use hub::{BroadcastHub, Delivery, StreamError};
pub use reading::{Reading, Timestamp};
pub use registry::{SubscriberRegistry, Subscription};
pub use server::{ServerConfig, TelemetryServer};
pub use session::{ReadingSink, SessionOutcome, StreamSession};
