//! Subscriber stream sessions
//!
//! One [`StreamSession`] per streaming subscription. The session owns its
//! registry membership through a [`Subscription`](crate::registry::Subscription)
//! guard and writes readings to a [`ReadingSink`].

pub mod sink;
pub mod state;
pub mod stream;

pub use sink::{ReadingSink, TransportError};
pub use state::SessionPhase;
pub use stream::{SessionEnd, SessionOutcome, StreamSession};
