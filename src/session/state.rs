//! Stream session state machine

/// Lifecycle phase of a stream session
///
/// Transitions are strictly forward:
/// `Created → Registered → Delivering → Closing → Closed`.
/// A session that fails authentication never leaves the caller's hands, so
/// it never reaches `Registered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SessionPhase {
    /// Authenticated, not yet in the registry
    Created,
    /// Queue allocated and visible to publishers
    Registered,
    /// Draining the queue into the sink
    Delivering,
    /// Leaving the registry and closing the queue
    Closing,
    /// Terminal
    Closed,
}

impl SessionPhase {
    /// Move to `next`, ignoring attempts to go backwards
    pub(super) fn advance(&mut self, next: SessionPhase) {
        debug_assert!(next >= *self, "session phase went backwards");
        if next > *self {
            *self = next;
        }
    }
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SessionPhase::Created => "created",
            SessionPhase::Registered => "registered",
            SessionPhase::Delivering => "delivering",
            SessionPhase::Closing => "closing",
            SessionPhase::Closed => "closed",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_forward() {
        let mut phase = SessionPhase::Created;

        phase.advance(SessionPhase::Registered);
        assert_eq!(phase, SessionPhase::Registered);

        phase.advance(SessionPhase::Closed);
        assert_eq!(phase, SessionPhase::Closed);
        assert_eq!(phase.to_string(), "closed");
    }
}
