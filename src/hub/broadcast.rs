//! Broadcast hub implementation
//!
//! Authenticates producer and consumer calls and fans readings out to every
//! registered subscriber queue.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::auth::{AuthError, AuthGate, Metadata};
use crate::reading::Reading;
use crate::registry::{PushOutcome, SubscriberRegistry};
use crate::session::{ReadingSink, SessionOutcome, StreamSession};
use crate::stats::{HubStats, HubStatsSnapshot};

use super::error::StreamError;

/// Per-publish fan-out report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Delivery {
    /// Subscribers in the snapshot
    pub attempted: usize,
    /// Subscribers whose queue took the reading
    pub accepted: usize,
    /// Subscribers whose queue was full or already closed
    pub dropped: usize,
}

/// Authenticated best-effort fan-out of readings
///
/// `publish` never waits: every push is a `try_push`, and a full queue loses
/// the reading for that subscriber only.
pub struct BroadcastHub {
    gate: AuthGate,
    registry: Arc<SubscriberRegistry>,
    stats: HubStats,
}

impl BroadcastHub {
    /// Create a hub over an existing registry
    pub fn new(gate: AuthGate, registry: Arc<SubscriberRegistry>) -> Self {
        Self {
            gate,
            registry,
            stats: HubStats::new(),
        }
    }

    /// Get a reference to the subscriber registry
    pub fn registry(&self) -> &Arc<SubscriberRegistry> {
        &self.registry
    }

    /// Publish a reading to every current subscriber
    ///
    /// Authentication failures return before the registry is touched.
    pub fn publish(
        &self,
        metadata: Option<&Metadata>,
        reading: Reading,
    ) -> Result<Delivery, AuthError> {
        if let Err(e) = self.gate.authenticate(metadata) {
            self.stats.record_rejected();
            return Err(e);
        }

        let queues = self.registry.snapshot();
        let mut delivery = Delivery {
            attempted: queues.len(),
            ..Delivery::default()
        };

        for queue in &queues {
            match queue.try_push(reading) {
                PushOutcome::Accepted => delivery.accepted += 1,
                PushOutcome::Full | PushOutcome::Closed => delivery.dropped += 1,
            }
        }

        self.stats
            .record_publish(delivery.accepted, delivery.dropped);

        if delivery.dropped > 0 {
            tracing::trace!(
                value = reading.value,
                subscribers = delivery.attempted,
                dropped = delivery.dropped,
                "Reading dropped for slow subscribers"
            );
        }

        Ok(delivery)
    }

    /// Authenticate a subscription call and create its session
    pub fn open_session(&self, metadata: Option<&Metadata>) -> Result<StreamSession, AuthError> {
        if let Err(e) = self.gate.authenticate(metadata) {
            self.stats.record_rejected();
            return Err(e);
        }

        Ok(StreamSession::new(Arc::clone(&self.registry)))
    }

    /// Authenticate and run a subscription to completion
    pub async fn stream_readings<S: ReadingSink>(
        &self,
        metadata: Option<&Metadata>,
        sink: &mut S,
        cancel: CancellationToken,
    ) -> Result<SessionOutcome, StreamError> {
        let session = self.open_session(metadata)?;
        Ok(session.run(sink, cancel).await?)
    }

    /// Fan-out counters
    pub fn stats(&self) -> HubStatsSnapshot {
        self.stats.snapshot()
    }

    /// Drop every subscriber; their sessions drain and end normally
    pub fn shutdown(&self) -> usize {
        self.registry.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reading::Timestamp;
    use crate::registry::RegistryConfig;

    const SECRET: &str = "test-token";

    fn hub() -> BroadcastHub {
        BroadcastHub::new(AuthGate::new(SECRET), Arc::new(SubscriberRegistry::new()))
    }

    fn reading(value: f64) -> Reading {
        Reading::new(value, Timestamp::new(1_700_000_000, 500))
    }

    #[test]
    fn test_publish_without_subscribers() {
        let hub = hub();
        let md = Metadata::bearer(SECRET);

        let delivery = hub.publish(Some(&md), reading(1.0)).unwrap();

        assert_eq!(delivery, Delivery::default());
        assert_eq!(hub.stats().published, 1);
    }

    #[test]
    fn test_publish_rejected_leaves_queues_untouched() {
        let hub = hub();
        let (_handle, mut queue) = hub.registry().register();

        let wrong = Metadata::bearer("nope");
        assert_eq!(
            hub.publish(Some(&wrong), reading(1.0)),
            Err(AuthError::TokenMismatch)
        );
        assert_eq!(
            hub.publish(Some(&Metadata::new()), reading(1.0)),
            Err(AuthError::EmptyCredential)
        );

        assert_eq!(queue.try_pop(), None);
        let stats = hub.stats();
        assert_eq!(stats.rejected, 2);
        assert_eq!(stats.published, 0);
    }

    #[test]
    fn test_publish_counts_drops() {
        let registry = Arc::new(SubscriberRegistry::with_config(
            RegistryConfig::default().queue_capacity(1),
        ));
        let hub = BroadcastHub::new(AuthGate::new(SECRET), Arc::clone(&registry));
        let md = Metadata::bearer(SECRET);

        let (_a, mut qa) = registry.register();
        let (_b, _qb) = registry.register();

        assert_eq!(
            hub.publish(Some(&md), reading(1.0)).unwrap(),
            Delivery {
                attempted: 2,
                accepted: 2,
                dropped: 0
            }
        );

        // Drain only the first subscriber; the second is now full
        assert_eq!(qa.try_pop(), Some(reading(1.0)));
        assert_eq!(
            hub.publish(Some(&md), reading(2.0)).unwrap(),
            Delivery {
                attempted: 2,
                accepted: 1,
                dropped: 1
            }
        );
    }

    #[test]
    fn test_open_session_requires_credentials() {
        let hub = hub();

        assert!(matches!(
            hub.open_session(None),
            Err(AuthError::MissingCredentials)
        ));
        assert!(hub.registry().is_empty());

        let md = Metadata::bearer(SECRET);
        let session = hub.open_session(Some(&md)).unwrap();
        assert_eq!(session.phase(), crate::session::SessionPhase::Created);
    }

    #[test]
    fn test_shutdown_clears_registry() {
        let hub = hub();
        let (_a, _qa) = hub.registry().register();
        let (_b, _qb) = hub.registry().register();

        assert_eq!(hub.shutdown(), 2);
        assert!(hub.registry().is_empty());
    }
}
