//! Bounded per-subscriber delivery queue
//!
//! A thin layer over `tokio::sync::mpsc` separating the two contracts:
//! publishers get a never-blocking [`QueueSender::try_push`], the owning
//! session gets an awaitable [`ReadingQueue::pop`].

use tokio::sync::mpsc::{self, error::TryRecvError, error::TrySendError};

use crate::reading::Reading;

/// Result of a non-blocking push
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// The reading was enqueued
    Accepted,
    /// The queue is at capacity; the reading was dropped
    Full,
    /// The consumer has closed the queue; the reading was dropped
    Closed,
}

/// Producer side of a subscriber queue
#[derive(Debug, Clone)]
pub struct QueueSender {
    tx: mpsc::Sender<Reading>,
}

impl QueueSender {
    /// Try to enqueue without waiting
    pub fn try_push(&self, reading: Reading) -> PushOutcome {
        match self.tx.try_send(reading) {
            Ok(()) => PushOutcome::Accepted,
            Err(TrySendError::Full(_)) => PushOutcome::Full,
            Err(TrySendError::Closed(_)) => PushOutcome::Closed,
        }
    }

    /// Whether the consumer side has gone away
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Total capacity of the queue
    pub fn capacity(&self) -> usize {
        self.tx.max_capacity()
    }
}

/// Consumer side of a subscriber queue
#[derive(Debug)]
pub struct ReadingQueue {
    rx: mpsc::Receiver<Reading>,
    capacity: usize,
}

impl ReadingQueue {
    /// Wait for the next reading
    ///
    /// Returns `None` once the queue is closed and drained. Cancel-safe: if
    /// the future is dropped before completing, no reading is lost.
    pub async fn pop(&mut self) -> Option<Reading> {
        self.rx.recv().await
    }

    /// Take the next reading if one is already queued
    pub fn try_pop(&mut self) -> Option<Reading> {
        match self.rx.try_recv() {
            Ok(reading) => Some(reading),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Take everything currently queued
    pub fn drain(&mut self) -> Vec<Reading> {
        std::iter::from_fn(|| self.try_pop()).collect()
    }

    /// Stop accepting pushes. Already queued readings can still be popped.
    pub fn close(&mut self) {
        self.rx.close();
    }

    /// Total capacity of the queue
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Create a bounded queue pair
pub fn bounded(capacity: usize) -> (QueueSender, ReadingQueue) {
    let capacity = capacity.max(1);
    let (tx, rx) = mpsc::channel(capacity);
    (QueueSender { tx }, ReadingQueue { rx, capacity })
}

#[cfg(test)]
mod tests {
    use tokio_test::{assert_pending, assert_ready_eq, task};

    use super::*;
    use crate::reading::Timestamp;

    fn reading(value: f64) -> Reading {
        Reading::new(value, Timestamp::new(1, 0))
    }

    #[test]
    fn test_push_until_full() {
        let (tx, mut rx) = bounded(2);

        assert_eq!(tx.try_push(reading(1.0)), PushOutcome::Accepted);
        assert_eq!(tx.try_push(reading(2.0)), PushOutcome::Accepted);
        assert_eq!(tx.try_push(reading(3.0)), PushOutcome::Full);

        let values: Vec<f64> = rx.drain().iter().map(|r| r.value).collect();
        assert_eq!(values, vec![1.0, 2.0]);
    }

    #[test]
    fn test_push_after_close() {
        let (tx, mut rx) = bounded(4);
        assert_eq!(tx.try_push(reading(1.0)), PushOutcome::Accepted);

        rx.close();

        assert!(tx.is_closed());
        assert_eq!(tx.try_push(reading(2.0)), PushOutcome::Closed);
        // Items queued before close are still delivered
        assert_eq!(rx.try_pop(), Some(reading(1.0)));
        assert_eq!(rx.try_pop(), None);
    }

    #[test]
    fn test_pop_waits_for_push() {
        let (tx, mut rx) = bounded(1);
        let mut pop = task::spawn(rx.pop());

        assert_pending!(pop.poll());

        tx.try_push(reading(7.5));
        assert!(pop.is_woken());
        assert_ready_eq!(pop.poll(), Some(reading(7.5)));
    }

    #[test]
    fn test_pop_ends_when_sender_dropped() {
        let (tx, mut rx) = bounded(1);
        drop(tx);

        let mut pop = task::spawn(rx.pop());
        assert_ready_eq!(pop.poll(), None);
    }

    #[test]
    fn test_capacity() {
        let (tx, rx) = bounded(0);
        assert_eq!(tx.capacity(), 1);
        assert_eq!(rx.capacity(), 1);
    }
}
