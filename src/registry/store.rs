//! Subscriber registry implementation
//!
//! The central set of active subscriber queues that the hub fans readings
//! out to.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use super::config::RegistryConfig;
use super::queue::{self, QueueSender, ReadingQueue};
use super::subscription::Subscription;

/// Opaque identity of a registered subscriber queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriberHandle(u64);

impl SubscriberHandle {
    /// Numeric value, for logging
    pub fn id(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubscriberHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Registration counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegistryStats {
    /// Subscribers registered since startup
    pub registered: u64,
    /// Subscribers actually removed since startup
    pub unregistered: u64,
    /// Currently registered subscribers
    pub active: usize,
}

/// Concurrency-safe set of active subscriber queues
///
/// `register`/`unregister` take the write lock for O(1)/O(log n) work;
/// `snapshot` takes the read lock only long enough to clone the senders, so
/// the fan-out never runs under the lock. The lock is never held across an
/// await point.
pub struct SubscriberRegistry {
    /// Map of handle to the producer side of its queue; keys are allocated
    /// in increasing order so iteration follows registration order
    subscribers: RwLock<BTreeMap<SubscriberHandle, QueueSender>>,

    next_id: AtomicU64,
    registered: AtomicU64,
    unregistered: AtomicU64,

    config: RegistryConfig,
}

impl SubscriberRegistry {
    /// Create a new registry with default configuration
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create a new registry with custom configuration
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            subscribers: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
            registered: AtomicU64::new(0),
            unregistered: AtomicU64::new(0),
            config,
        }
    }

    /// Get the registry configuration
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Add a new subscriber queue
    ///
    /// The caller owns the returned queue and is responsible for calling
    /// [`unregister`](Self::unregister). Prefer [`subscribe`](Self::subscribe),
    /// which does that automatically.
    pub fn register(&self) -> (SubscriberHandle, ReadingQueue) {
        let handle = SubscriberHandle(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = queue::bounded(self.config.queue_capacity);

        let active = {
            let mut subscribers = self.subscribers.write();
            subscribers.insert(handle, tx);
            subscribers.len()
        };
        self.registered.fetch_add(1, Ordering::Relaxed);

        tracing::debug!(
            subscriber = %handle,
            subscribers = active,
            capacity = self.config.queue_capacity,
            "Subscriber added"
        );

        (handle, rx)
    }

    /// Register and wrap the queue in a guard that unregisters on drop
    pub fn subscribe(self: &Arc<Self>) -> Subscription {
        let (handle, queue) = self.register();
        Subscription::new(Arc::clone(self), handle, queue)
    }

    /// Remove a subscriber
    ///
    /// Returns `false` if the handle was not registered (already removed or
    /// cleared); that is not an error.
    pub fn unregister(&self, handle: SubscriberHandle) -> bool {
        let (removed, active) = {
            let mut subscribers = self.subscribers.write();
            let removed = subscribers.remove(&handle).is_some();
            (removed, subscribers.len())
        };

        if removed {
            self.unregistered.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(
                subscriber = %handle,
                subscribers = active,
                "Subscriber removed"
            );
        }

        removed
    }

    /// Consistent copy of the current subscriber queues, in registration order
    ///
    /// May be stale by the time it is used; a subscriber removed after the
    /// snapshot simply reports [`PushOutcome::Closed`](super::PushOutcome).
    pub fn snapshot(&self) -> Vec<QueueSender> {
        self.subscribers.read().values().cloned().collect()
    }

    /// Whether a handle is currently registered
    pub fn contains(&self, handle: SubscriberHandle) -> bool {
        self.subscribers.read().contains_key(&handle)
    }

    /// Number of registered subscribers
    pub fn len(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Whether no subscribers are registered
    pub fn is_empty(&self) -> bool {
        self.subscribers.read().is_empty()
    }

    /// Remove every subscriber
    ///
    /// Dropping the senders closes each queue, so sessions drain what is
    /// already queued and then finish normally. Returns how many were removed.
    pub fn clear(&self) -> usize {
        let removed = std::mem::take(&mut *self.subscribers.write()).len();
        self.unregistered
            .fetch_add(removed as u64, Ordering::Relaxed);

        if removed > 0 {
            tracing::info!(subscribers = removed, "Registry cleared");
        }

        removed
    }

    /// Registration counters
    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            registered: self.registered.load(Ordering::Relaxed),
            unregistered: self.unregistered.load(Ordering::Relaxed),
            active: self.len(),
        }
    }
}

impl Default for SubscriberRegistry {
    fn default() -> Self {
        Self::new()
    }
}
