//! Telemetry wire protocol
//!
//! Length-prefixed binary frames carrying the two calls of the service:
//!
//! ```text
//! Producer                                 Server
//!   |------- Push (metadata, reading) ----->|
//!   |<------ Ack | Status -----------------|
//!   |------- Push ... ---------------------->|
//!
//! Consumer                                 Server
//!   |------- Subscribe (metadata, filter) ->|
//!   |<------ Ack | Status -----------------|
//!   |<------ Reading ----------------------|
//!   |<------ Reading ----------------------|
//!   |              ...                      |
//! ```
//!
//! All integers are big-endian.
//!
//! A consumer keeps both directions of its socket open for the life of the
//! stream: end of input from the consumer ends the subscription. A client
//! turned away by the connection limit receives a single `Status`
//! (`Unavailable`) before the socket closes.

pub mod codec;
pub mod constants;
pub mod framed;
pub mod message;

pub use framed::{FrameReader, FrameWriter};
pub use message::{Message, StatusCode};
