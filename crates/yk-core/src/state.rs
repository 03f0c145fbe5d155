//! Transport session states.

use std::fmt;

/// Where a HID session is in its request cycle.
///
/// ```text
/// Idle -> Opened -> { Writing | Polling | ReadingResponse } -> Opened ... -> Idle
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No device handle.
    #[default]
    Idle,
    /// Handle open, no operation in flight.
    Opened,
    /// Writing frame reports.
    Writing,
    /// Waiting for a status flag transition.
    Polling,
    /// Collecting response reports.
    ReadingResponse,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "IDLE"),
            SessionState::Opened => write!(f, "OPENED"),
            SessionState::Writing => write!(f, "WRITING"),
            SessionState::Polling => write!(f, "POLLING"),
            SessionState::ReadingResponse => write!(f, "READING_RESPONSE"),
        }
    }
}

impl SessionState {
    /// Check if an operation is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            SessionState::Writing | SessionState::Polling | SessionState::ReadingResponse
        )
    }

    /// Check if the device handle is usable.
    pub fn is_open(&self) -> bool {
        !matches!(self, SessionState::Idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_idle() {
        let state = SessionState::default();
        assert_eq!(state, SessionState::Idle);
        assert!(!state.is_open());
        assert!(!state.is_busy());
    }

    #[test]
    fn test_busy_states() {
        assert!(SessionState::Polling.is_busy());
        assert!(SessionState::ReadingResponse.is_open());
        assert!(!SessionState::Opened.is_busy());
    }
}
