//! Statistics for the hub and server

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Fan-out counters, updated lock-free from any publisher
#[derive(Debug, Default)]
pub struct HubStats {
    published: AtomicU64,
    rejected: AtomicU64,
    accepted: AtomicU64,
    dropped: AtomicU64,
}

impl HubStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an authenticated publish and its per-subscriber results
    pub fn record_publish(&self, accepted: usize, dropped: usize) {
        self.published.fetch_add(1, Ordering::Relaxed);
        self.accepted.fetch_add(accepted as u64, Ordering::Relaxed);
        self.dropped.fetch_add(dropped as u64, Ordering::Relaxed);
    }

    /// Record a call rejected by authentication
    pub fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of the counters
    pub fn snapshot(&self) -> HubStatsSnapshot {
        HubStatsSnapshot {
            published: self.published.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            accepted: self.accepted.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

/// Copy of [`HubStats`] at one moment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HubStatsSnapshot {
    /// Readings accepted from producers
    pub published: u64,
    /// Calls rejected by authentication (publish and subscribe)
    pub rejected: u64,
    /// Readings enqueued for a subscriber
    pub accepted: u64,
    /// Readings dropped because a subscriber queue was full or closed
    pub dropped: u64,
}

impl HubStatsSnapshot {
    /// Fraction of fan-out attempts that were dropped
    pub fn drop_ratio(&self) -> f64 {
        let attempts = self.accepted + self.dropped;
        if attempts > 0 {
            self.dropped as f64 / attempts as f64
        } else {
            0.0
        }
    }
}

/// Server-wide connection statistics
#[derive(Debug)]
pub struct ServerStats {
    started_at: Instant,
    total_connections: AtomicU64,
    active_connections: AtomicU64,
    rejected_connections: AtomicU64,
}

impl ServerStats {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            total_connections: AtomicU64::new(0),
            active_connections: AtomicU64::new(0),
            rejected_connections: AtomicU64::new(0),
        }
    }

    pub fn connection_opened(&self) {
        self.total_connections.fetch_add(1, Ordering::Relaxed);
        self.active_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_closed(&self) {
        self.active_connections.fetch_sub(1, Ordering::Relaxed);
    }

    /// Connection refused because the limit was reached
    pub fn connection_rejected(&self) {
        self.rejected_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn total_connections(&self) -> u64 {
        self.total_connections.load(Ordering::Relaxed)
    }

    pub fn active_connections(&self) -> u64 {
        self.active_connections.load(Ordering::Relaxed)
    }

    pub fn rejected_connections(&self) -> u64 {
        self.rejected_connections.load(Ordering::Relaxed)
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}

impl Default for ServerStats {
    fn default() -> Self {
        Self::new()
    }
}
