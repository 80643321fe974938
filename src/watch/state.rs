//! Watch cycle state machine
//!
//! IDLE → RESYNC → RUN_DOWNSTREAM → IDLE
//!
//! A failed resync returns straight to IDLE; no path skips RESYNC.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WatchState {
    /// Waiting for the next change burst
    #[default]
    Idle,
    /// Re-running the prepare stage
    Resync,
    /// Running the configured downstream tasks
    RunDownstream,
}

impl WatchState {
    /// Check if transition from this state to target is valid
    pub fn can_transition_to(&self, target: WatchState) -> bool {
        matches!(
            (self, target),
            (WatchState::Idle, WatchState::Resync)
                | (WatchState::Resync, WatchState::RunDownstream)
                | (WatchState::Resync, WatchState::Idle)
                | (WatchState::RunDownstream, WatchState::Idle)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WatchState::Idle => "IDLE",
            WatchState::Resync => "RESYNC",
            WatchState::RunDownstream => "RUN_DOWNSTREAM",
        }
    }
}

impl fmt::Display for WatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        assert!(WatchState::Idle.can_transition_to(WatchState::Resync));
        assert!(WatchState::Resync.can_transition_to(WatchState::RunDownstream));
        assert!(WatchState::RunDownstream.can_transition_to(WatchState::Idle));
    }

    #[test]
    fn test_failed_resync_returns_to_idle() {
        assert!(WatchState::Resync.can_transition_to(WatchState::Idle));
    }

    #[test]
    fn test_resync_cannot_be_skipped() {
        assert!(!WatchState::Idle.can_transition_to(WatchState::RunDownstream));
        assert!(!WatchState::RunDownstream.can_transition_to(WatchState::Resync));
        assert!(!WatchState::Idle.can_transition_to(WatchState::Idle));
    }

    #[test]
    fn test_serialized_names() {
        let json = serde_json::to_string(&WatchState::RunDownstream).unwrap();
        assert_eq!(json, "\"RUN_DOWNSTREAM\"");
        assert_eq!(WatchState::Resync.to_string(), "RESYNC");
    }
}
