//! Statistics and metrics for the hub and server

pub mod metrics;

pub use metrics::{HubStats, HubStatsSnapshot, ServerStats};
