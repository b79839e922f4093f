//! Protocol constants

/// Default listen port
pub const DEFAULT_PORT: u16 = 50051;

/// Frame header: message type (1 byte) + payload length (4 bytes)
pub const FRAME_HEADER_SIZE: usize = 5;

/// Default maximum payload size of a single frame
pub const DEFAULT_MAX_FRAME_SIZE: usize = 64 * 1024;

/// Default capacity of each subscriber's delivery queue
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Metadata key carrying the credential
pub const AUTHORIZATION_KEY: &str = "authorization";

/// Credential scheme prefix, including the separating space
pub const BEARER_PREFIX: &str = "Bearer ";

// Message types
pub const MSG_PUSH: u8 = 0x01;
pub const MSG_SUBSCRIBE: u8 = 0x02;
pub const MSG_ACK: u8 = 0x03;
pub const MSG_READING: u8 = 0x04;
pub const MSG_STATUS: u8 = 0x05;

/// Encoded size of a reading: value f64 + seconds i64 + nanos u32
pub const READING_SIZE: usize = 8 + 8 + 4;
