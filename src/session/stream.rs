//! Per-subscriber stream session
//!
//! A session bridges one registry entry to one outbound sink: it registers,
//! drains its private queue into the sink, and leaves the registry on every
//! exit path.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::registry::{SubscriberRegistry, Subscription};

use super::sink::{ReadingSink, TransportError};
use super::state::SessionPhase;

/// Why a session ended without error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The caller disconnected or the server is shutting down
    Cancelled,
    /// The queue was closed and fully drained
    QueueClosed,
}

/// Result of a session that ended without a transport error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOutcome {
    /// How the session ended
    pub end: SessionEnd,
    /// Readings successfully forwarded to the sink
    pub delivered: u64,
}

/// Lifecycle of a single subscription
///
/// Created by [`BroadcastHub::open_session`](crate::hub::BroadcastHub::open_session)
/// once the caller has been authenticated. Nothing is registered until
/// [`run`](Self::run) is called.
pub struct StreamSession {
    registry: Arc<SubscriberRegistry>,
    phase: SessionPhase,
    delivered: u64,
}

impl StreamSession {
    /// Create a session in the `Created` phase
    pub fn new(registry: Arc<SubscriberRegistry>) -> Self {
        Self {
            registry,
            phase: SessionPhase::Created,
            delivered: 0,
        }
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Register, deliver until the session ends, then unregister
    ///
    /// Ends with:
    /// - `Ok` / [`SessionEnd::Cancelled`] when `cancel` fires,
    /// - `Ok` / [`SessionEnd::QueueClosed`] when the registry drops the queue,
    /// - `Err` with the sink's error on the first failed write (no retry).
    pub async fn run<S: ReadingSink>(
        mut self,
        sink: &mut S,
        cancel: CancellationToken,
    ) -> Result<SessionOutcome, TransportError> {
        let mut subscription = self.registry.subscribe();
        self.phase.advance(SessionPhase::Registered);
        let handle = subscription.handle();

        let result = self.deliver(&mut subscription, sink, &cancel).await;

        self.phase.advance(SessionPhase::Closing);
        drop(subscription);
        self.phase.advance(SessionPhase::Closed);

        match &result {
            Ok(outcome) => tracing::debug!(
                subscriber = %handle,
                end = ?outcome.end,
                delivered = outcome.delivered,
                "Stream session finished"
            ),
            Err(e) => tracing::debug!(
                subscriber = %handle,
                delivered = self.delivered,
                error = %e,
                "Stream session failed"
            ),
        }

        result
    }

    async fn deliver<S: ReadingSink>(
        &mut self,
        subscription: &mut Subscription,
        sink: &mut S,
        cancel: &CancellationToken,
    ) -> Result<SessionOutcome, TransportError> {
        sink.opened().await?;
        self.phase.advance(SessionPhase::Delivering);

        loop {
            let reading = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(self.outcome(SessionEnd::Cancelled)),
                next = subscription.recv() => match next {
                    Some(reading) => reading,
                    None => return Ok(self.outcome(SessionEnd::QueueClosed)),
                },
            };

            sink.send(reading).await?;
            self.delivered += 1;
        }
    }

    fn outcome(&self, end: SessionEnd) -> SessionOutcome {
        SessionOutcome {
            end,
            delivered: self.delivered,
        }
    }
}

impl std::fmt::Debug for StreamSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamSession")
            .field("phase", &self.phase)
            .field("delivered", &self.delivered)
            .finish()
    }
}
