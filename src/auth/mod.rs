//! Bearer-token authentication for producer and consumer calls
//!
//! Every call carries transport-level [`Metadata`]. The [`AuthGate`] checks
//! its `authorization` entry against the configured shared secret before the
//! call is allowed anywhere near the subscriber registry.

pub mod error;
pub mod gate;
pub mod metadata;

pub use error::AuthError;
pub use gate::AuthGate;
pub use metadata::Metadata;
