//! Subscriber registry for reading fan-out
//!
//! The registry holds one bounded delivery queue per active subscriber. The
//! hub takes a snapshot of the queues and pushes into each without blocking;
//! each session drains its own queue.
//!
//! # Architecture
//!
//! ```text
//!                       Arc<SubscriberRegistry>
//!                  ┌──────────────────────────────┐
//!                  │ subscribers: RwLock<BTreeMap< │
//!                  │   SubscriberHandle,           │
//!                  │   QueueSender,                │
//!                  │ >>                            │
//!                  └──────────────┬───────────────┘
//!                                 │ snapshot()
//!         ┌───────────────────────┼───────────────────────┐
//!         │                       │                       │
//!         ▼                       ▼                       ▼
//!    [Producer]             [Session]               [Session]
//!    hub.publish()          queue.pop()             queue.pop()
//!         │                       │                       │
//!         └──► try_push() ───────►└──► sink.send() ──► TCP
//! ```
//!
//! # Overload
//!
//! A full queue drops the new reading for that subscriber only. A slow
//! consumer never slows the producer or any other consumer.

pub mod config;
pub mod queue;
pub mod store;
pub mod subscription;

pub use config::RegistryConfig;
pub use queue::{PushOutcome, QueueSender, ReadingQueue};
pub use store::{RegistryStats, SubscriberHandle, SubscriberRegistry};
pub use subscription::Subscription;
