//! End-to-end behaviour of the hub, registry and sessions without a network

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use telemetry_hub::session::{SessionEnd, TransportError};
use telemetry_hub::{
    AuthError, AuthGate, BroadcastHub, Metadata, Reading, ReadingSink, SessionOutcome, StreamError,
    SubscriberRegistry, Timestamp,
};

const SECRET: &str = "scenario-secret";

fn hub() -> Arc<BroadcastHub> {
    Arc::new(BroadcastHub::new(
        AuthGate::new(SECRET),
        Arc::new(SubscriberRegistry::new()),
    ))
}

fn credentials() -> Metadata {
    Metadata::bearer(SECRET)
}

fn reading(value: f64) -> Reading {
    Reading::new(value, Timestamp::new(1_700_000_000, 250_000_000))
}

async fn wait_for_subscribers(hub: &BroadcastHub, count: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while hub.registry().len() != count {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("subscribers did not register in time");
}

/// Collects readings; fails the `fail_on`-th write if set
struct CollectingSink {
    tx: mpsc::UnboundedSender<Reading>,
    writes: usize,
    fail_on: Option<usize>,
}

impl ReadingSink for CollectingSink {
    async fn send(&mut self, reading: Reading) -> Result<(), TransportError> {
        self.writes += 1;
        if Some(self.writes) == self.fail_on {
            return Err(TransportError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "subscriber went away",
            )));
        }
        self.tx.send(reading).map_err(|_| TransportError::Closed)
    }
}

fn spawn_subscriber(
    hub: &Arc<BroadcastHub>,
    fail_on: Option<usize>,
    cancel: CancellationToken,
) -> (
    JoinHandle<Result<SessionOutcome, StreamError>>,
    mpsc::UnboundedReceiver<Reading>,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    let hub = Arc::clone(hub);
    let task = tokio::spawn(async move {
        let mut sink = CollectingSink {
            tx,
            writes: 0,
            fail_on,
        };
        hub.stream_readings(Some(&credentials()), &mut sink, cancel)
            .await
    });
    (task, rx)
}

#[tokio::test]
async fn publish_with_no_subscribers_succeeds() {
    let hub = hub();

    let delivery = hub.publish(Some(&credentials()), reading(1.0)).unwrap();

    assert_eq!(delivery.attempted, 0);
    assert_eq!(hub.stats().published, 1);
}

#[tokio::test]
async fn scenario_a_single_subscriber_gets_exact_reading() {
    let hub = hub();
    let (_handle, mut queue) = hub.registry().register();
    let ts = Timestamp::new(1_712_345_678, 987_654_321);

    hub.publish(Some(&credentials()), Reading::new(22.5, ts))
        .unwrap();

    let received = queue.try_pop().unwrap();
    assert_eq!(received.value, 22.5);
    assert_eq!(received.timestamp, ts);
    assert_eq!(queue.try_pop(), None);
}

#[tokio::test]
async fn scenario_b_missing_credentials_leave_registry_unchanged() {
    let hub = hub();
    let (_handle, mut queue) = hub.registry().register();
    let before = hub.registry().len();

    let result = hub.publish(None, reading(22.5));

    assert_eq!(result, Err(AuthError::MissingCredentials));
    assert_eq!(hub.registry().len(), before);
    assert_eq!(queue.try_pop(), None);
}

#[tokio::test]
async fn scenario_c_every_subscriber_gets_the_reading() {
    let hub = hub();
    let (_a, mut qa) = hub.registry().register();
    let (_b, mut qb) = hub.registry().register();

    hub.publish(Some(&credentials()), reading(3.25)).unwrap();

    assert_eq!(qa.drain(), vec![reading(3.25)]);
    assert_eq!(qb.drain(), vec![reading(3.25)]);
}

#[tokio::test]
async fn scenario_d_full_queue_drops_newest() {
    let hub = hub();
    let (_handle, mut queue) = hub.registry().register();
    assert_eq!(queue.capacity(), 100);

    for i in 0..100 {
        hub.publish(Some(&credentials()), reading(f64::from(i)))
            .unwrap();
    }
    let overflow = hub.publish(Some(&credentials()), reading(100.0)).unwrap();
    assert_eq!(overflow.dropped, 1);

    let drained = queue.drain();
    assert_eq!(drained.len(), 100);
    assert_eq!(drained.last().map(|r| r.value), Some(99.0));
    assert!(drained.iter().all(|r| r.value != 100.0));
}

#[tokio::test]
async fn scenario_e_failing_subscriber_does_not_affect_others() {
    let hub = hub();
    let cancel = CancellationToken::new();

    let (failing, mut failing_rx) = spawn_subscriber(&hub, Some(3), cancel.clone());
    let (healthy, mut healthy_rx) = spawn_subscriber(&hub, None, cancel.clone());
    wait_for_subscribers(&hub, 2).await;

    for i in 1..=5 {
        hub.publish(Some(&credentials()), reading(f64::from(i)))
            .unwrap();
    }

    let result = failing.await.unwrap();
    assert!(matches!(result, Err(StreamError::Transport(TransportError::Io(_)))));

    // Exactly two readings made it out before the write failure
    assert_eq!(failing_rx.recv().await, Some(reading(1.0)));
    assert_eq!(failing_rx.recv().await, Some(reading(2.0)));
    assert_eq!(failing_rx.recv().await, None);

    // Unregistered exactly once, the healthy subscriber is still there
    let stats = hub.registry().stats();
    assert_eq!(stats.unregistered, 1);
    assert_eq!(stats.active, 1);

    hub.publish(Some(&credentials()), reading(6.0)).unwrap();
    for i in 1..=6 {
        assert_eq!(healthy_rx.recv().await, Some(reading(f64::from(i))));
    }

    cancel.cancel();
    let outcome = healthy.await.unwrap().unwrap();
    assert_eq!(outcome.end, SessionEnd::Cancelled);
    assert_eq!(outcome.delivered, 6);
    assert!(hub.registry().is_empty());
}

#[tokio::test]
async fn rejected_subscription_never_registers() {
    let hub = hub();
    let (tx, _rx) = mpsc::unbounded_channel();
    let mut sink = CollectingSink {
        tx,
        writes: 0,
        fail_on: None,
    };

    let result = hub
        .stream_readings(
            Some(&Metadata::bearer("wrong")),
            &mut sink,
            CancellationToken::new(),
        )
        .await;

    assert!(matches!(result, Err(StreamError::Auth(AuthError::TokenMismatch))));
    assert_eq!(hub.registry().stats().registered, 0);
    assert_eq!(hub.stats().rejected, 1);
}

#[tokio::test]
async fn shutdown_ends_sessions_normally() {
    let hub = hub();
    let (task, _rx) = spawn_subscriber(&hub, None, CancellationToken::new());
    wait_for_subscribers(&hub, 1).await;

    assert_eq!(hub.shutdown(), 1);

    let outcome = task.await.unwrap().unwrap();
    assert_eq!(outcome.end, SessionEnd::QueueClosed);
}

#[tokio::test]
async fn per_subscriber_order_is_publish_order() {
    let hub = hub();
    let cancel = CancellationToken::new();
    let (task, mut rx) = spawn_subscriber(&hub, None, cancel.clone());
    wait_for_subscribers(&hub, 1).await;

    for i in 0..50 {
        hub.publish(Some(&credentials()), reading(f64::from(i)))
            .unwrap();
    }

    for i in 0..50 {
        assert_eq!(rx.recv().await.map(|r| r.value), Some(f64::from(i)));
    }

    cancel.cancel();
    task.await.unwrap().unwrap();
}

/// Takes a while per write, like a consumer on a slow link
struct SlowSink {
    delay: Duration,
    delivered: Vec<Reading>,
}

impl ReadingSink for SlowSink {
    async fn send(&mut self, reading: Reading) -> Result<(), TransportError> {
        tokio::time::sleep(self.delay).await;
        self.delivered.push(reading);
        Ok(())
    }
}

#[tokio::test]
async fn shutdown_drains_queued_readings_before_ending() {
    let hub = hub();
    let task = {
        let hub = Arc::clone(&hub);
        tokio::spawn(async move {
            let mut sink = SlowSink {
                delay: Duration::from_millis(20),
                delivered: Vec::new(),
            };
            let outcome = hub
                .stream_readings(Some(&credentials()), &mut sink, CancellationToken::new())
                .await;
            (outcome, sink.delivered)
        })
    };
    wait_for_subscribers(&hub, 1).await;

    for i in 0..10 {
        hub.publish(Some(&credentials()), reading(f64::from(i)))
            .unwrap();
    }
    assert_eq!(hub.shutdown(), 1);

    let (outcome, delivered) = task.await.unwrap();
    let outcome = outcome.unwrap();
    assert_eq!(outcome.end, SessionEnd::QueueClosed);
    assert_eq!(outcome.delivered, 10);
    assert_eq!(
        delivered.iter().map(|r| r.value).collect::<Vec<_>>(),
        (0..10).map(f64::from).collect::<Vec<_>>()
    );
}
