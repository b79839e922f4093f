//! Telemetry reading types
//!
//! A [`Reading`] is the unit that flows from producers through the hub to
//! every subscriber. It is `Copy`, so each subscriber receives its own value.

use std::time::{SystemTime, UNIX_EPOCH};

const NANOS_PER_SEC: u32 = 1_000_000_000;

/// Wall-clock instant relative to the UNIX epoch
///
/// Same shape as a protobuf `Timestamp`: whole seconds plus a non-negative
/// nanosecond fraction, so instants before 1970 are representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp {
    /// Seconds since the epoch (may be negative)
    pub seconds: i64,
    /// Fractional part, always `< 1_000_000_000`
    pub nanos: u32,
}

impl Timestamp {
    /// Create a timestamp, normalising an overflowing nanosecond part
    pub fn new(seconds: i64, nanos: u32) -> Self {
        Self {
            seconds: seconds + i64::from(nanos / NANOS_PER_SEC),
            nanos: nanos % NANOS_PER_SEC,
        }
    }

    /// Current system time
    pub fn now() -> Self {
        Self::from(SystemTime::now())
    }
}

impl From<SystemTime> for Timestamp {
    fn from(time: SystemTime) -> Self {
        match time.duration_since(UNIX_EPOCH) {
            Ok(since) => Self {
                seconds: since.as_secs() as i64,
                nanos: since.subsec_nanos(),
            },
            Err(err) => {
                // Before the epoch: borrow one second so nanos stays positive
                let before = err.duration();
                let mut seconds = -(before.as_secs() as i64);
                let mut nanos = before.subsec_nanos();
                if nanos > 0 {
                    seconds -= 1;
                    nanos = NANOS_PER_SEC - nanos;
                }
                Self { seconds, nanos }
            }
        }
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:09}", self.seconds, self.nanos)
    }
}

/// A timestamped scalar value produced by a telemetry source
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// Measured value
    pub value: f64,
    /// When the value was measured
    pub timestamp: Timestamp,
}

impl Reading {
    /// Create a reading
    pub fn new(value: f64, timestamp: Timestamp) -> Self {
        Self { value, timestamp }
    }

    /// Create a reading stamped with the current time
    pub fn now(value: f64) -> Self {
        Self::new(value, Timestamp::now())
    }
}
