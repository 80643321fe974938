//! Signal handling for the long-running watch workflow (SIGINT/SIGTERM)
//!
//! On the first signal the watch loop is asked to stop: a cycle already in
//! flight runs to completion, then the loop returns and the process exits 0.
//! A second signal exits immediately.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

/// Exit code used when a second signal forces an immediate exit
pub const EXIT_CODE_INTERRUPTED: i32 = 130;

/// Shared shutdown state
#[derive(Debug, Default)]
pub struct ShutdownState {
    /// Set by the first signal; polled by the watch loop
    requested: AtomicBool,
    signal_count: AtomicU8,
}

impl ShutdownState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if shutdown has been requested
    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// The flag the watch loop polls
    pub fn flag(&self) -> &AtomicBool {
        &self.requested
    }

    pub fn signal_count(&self) -> u8 {
        self.signal_count.load(Ordering::SeqCst)
    }

    /// Handle a signal, returning the action to take
    pub fn handle_signal(&self) -> SignalAction {
        let count = self.signal_count.fetch_add(1, Ordering::SeqCst);

        if count == 0 {
            self.requested.store(true, Ordering::SeqCst);
            SignalAction::Shutdown
        } else if count == 1 {
            SignalAction::ImmediateExit
        } else {
            SignalAction::Ignore
        }
    }
}

/// Action to take after receiving a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalAction {
    /// First signal: stop after the in-flight cycle
    Shutdown,
    /// Second signal: exit now
    ImmediateExit,
    /// Third+ signal: ignore
    Ignore,
}

/// Installs the process signal handler around a [`ShutdownState`]
pub struct SignalHandler {
    state: Arc<ShutdownState>,
}

impl SignalHandler {
    pub fn new() -> Self {
        Self {
            state: Arc::new(ShutdownState::new()),
        }
    }

    pub fn state(&self) -> Arc<ShutdownState> {
        Arc::clone(&self.state)
    }

    /// Install the handler. Must be called at most once per process.
    pub fn install(&self) -> Result<(), ctrlc::Error> {
        let state = Arc::clone(&self.state);
        ctrlc::set_handler(move || match state.handle_signal() {
            SignalAction::Shutdown => {
                tracing::info!("interrupt received, stopping after the current cycle");
            }
            SignalAction::ImmediateExit => {
                eprintln!("\nReceived second interrupt, exiting immediately...");
                std::process::exit(EXIT_CODE_INTERRUPTED);
            }
            SignalAction::Ignore => {}
        })
    }
}

impl Default for SignalHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = ShutdownState::new();
        assert!(!state.is_requested());
        assert_eq!(state.signal_count(), 0);
    }

    #[test]
    fn test_first_signal_requests_shutdown() {
        let state = ShutdownState::new();

        assert_eq!(state.handle_signal(), SignalAction::Shutdown);
        assert!(state.is_requested());
        assert!(state.flag().load(Ordering::SeqCst));
    }

    #[test]
    fn test_second_signal_exits() {
        let state = ShutdownState::new();
        state.handle_signal();
        assert_eq!(state.handle_signal(), SignalAction::ImmediateExit);
    }

    #[test]
    fn test_further_signals_ignored() {
        let state = ShutdownState::new();
        state.handle_signal();
        state.handle_signal();
        assert_eq!(state.handle_signal(), SignalAction::Ignore);
        assert_eq!(state.signal_count(), 3);
    }
}
