//! Scoped registry membership

use std::sync::Arc;

use crate::reading::Reading;

use super::queue::ReadingQueue;
use super::store::{SubscriberHandle, SubscriberRegistry};

/// A registered subscriber queue that removes itself when dropped
///
/// Dropping runs `unregister` and closes the queue exactly once, whichever
/// way the owner exits: normal return, `?` on an error, panic unwinding, or
/// the owning future being cancelled.
pub struct Subscription {
    registry: Arc<SubscriberRegistry>,
    handle: SubscriberHandle,
    queue: ReadingQueue,
}

impl Subscription {
    pub(super) fn new(
        registry: Arc<SubscriberRegistry>,
        handle: SubscriberHandle,
        queue: ReadingQueue,
    ) -> Self {
        Self {
            registry,
            handle,
            queue,
        }
    }

    /// Handle identifying this subscriber in the registry
    pub fn handle(&self) -> SubscriberHandle {
        self.handle
    }

    /// Wait for the next reading; `None` once the queue is closed and empty
    pub async fn recv(&mut self) -> Option<Reading> {
        self.queue.pop().await
    }

    /// Take the next reading if one is already queued
    pub fn try_recv(&mut self) -> Option<Reading> {
        self.queue.try_pop()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.registry.unregister(self.handle);
        self.queue.close();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("handle", &self.handle)
            .finish()
    }
}
