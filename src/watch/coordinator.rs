//! Single-flight watch loop
//!
//! Change events queue up on a channel. The loop takes the first one,
//! lets the burst settle, drains the queue, and runs exactly one
//! RESYNC + RUN_DOWNSTREAM pass for everything it drained. Events that
//! arrive while the pass is in flight are absorbed into it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::events::WatchEvent;
use super::state::WatchState;
use super::{CycleError, WatchError, WatchSpec};
use crate::stage::StageReport;

/// How often the loop checks the shutdown flag while idle
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// The work a watch cycle performs
pub trait CycleHandler {
    /// Re-run the prepare stage
    fn resync(&mut self) -> Result<StageReport, CycleError>;

    /// Run the downstream tasks, in order, stopping at the first failure
    fn run_downstream(&mut self, tasks: &[String]) -> Result<(), CycleError>;
}

/// What one cycle did
#[derive(Debug)]
pub struct CycleOutcome {
    /// Change events drained before the cycle started
    pub events: usize,
    /// Change events absorbed while the cycle was running
    pub coalesced: usize,
    pub result: Result<StageReport, CycleError>,
}

impl CycleOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Totals over the life of a watch loop
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchSummary {
    pub cycles: usize,
    pub failed_cycles: usize,
    pub events: usize,
    pub notifier_errors: usize,
}

/// Drains the event queue one cycle at a time
pub struct WatchCoordinator {
    spec: WatchSpec,
    state: WatchState,
    debounce: Duration,
    poll_interval: Duration,
    summary: WatchSummary,
}

impl WatchCoordinator {
    pub fn new(spec: WatchSpec) -> Self {
        Self {
            spec,
            state: WatchState::Idle,
            debounce: Duration::ZERO,
            poll_interval: DEFAULT_POLL_INTERVAL,
            summary: WatchSummary::default(),
        }
    }

    /// Quiet period after the first event of a burst
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn spec(&self) -> &WatchSpec {
        &self.spec
    }

    pub fn state(&self) -> WatchState {
        self.state
    }

    pub fn summary(&self) -> &WatchSummary {
        &self.summary
    }

    /// Run until `shutdown` is set or the event channel closes.
    ///
    /// Cycle failures are logged and do not end the loop.
    pub fn run(
        &mut self,
        events: &Receiver<WatchEvent>,
        handler: &mut dyn CycleHandler,
        shutdown: &AtomicBool,
    ) -> Result<WatchSummary, WatchError> {
        while self.next_cycle(events, handler, shutdown)?.is_some() {}
        info!(
            cycles = self.summary.cycles,
            failed = self.summary.failed_cycles,
            "watch loop stopped"
        );
        Ok(self.summary.clone())
    }

    /// Wait for the next change burst and run one cycle for it.
    ///
    /// Returns `None` once shutdown is requested or the channel is closed.
    pub fn next_cycle(
        &mut self,
        events: &Receiver<WatchEvent>,
        handler: &mut dyn CycleHandler,
        shutdown: &AtomicBool,
    ) -> Result<Option<CycleOutcome>, WatchError> {
        let first = loop {
            if shutdown.load(Ordering::SeqCst) {
                return Ok(None);
            }
            match events.recv_timeout(self.poll_interval) {
                Ok(WatchEvent::Changed(paths)) => break paths,
                Ok(WatchEvent::Error(message)) => self.notifier_error(&message),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return Ok(None),
            }
        };
        debug!(paths = ?first, "change detected");

        if !self.debounce.is_zero() {
            thread::sleep(self.debounce);
        }
        let burst = 1 + self.drain(events);
        self.summary.events += burst;

        let result = self.run_cycle(handler)?;

        let coalesced = self.drain(events);
        self.summary.events += coalesced;
        if coalesced > 0 {
            debug!(coalesced, "events absorbed by the finished cycle");
        }

        self.summary.cycles += 1;
        if result.is_err() {
            self.summary.failed_cycles += 1;
        }

        Ok(Some(CycleOutcome {
            events: burst,
            coalesced,
            result,
        }))
    }

    fn run_cycle(
        &mut self,
        handler: &mut dyn CycleHandler,
    ) -> Result<Result<StageReport, CycleError>, WatchError> {
        self.transition(WatchState::Resync)?;
        let report = match handler.resync() {
            Ok(report) => report,
            Err(e) => {
                error!(error = %e, "resync failed; waiting for the next change");
                self.transition(WatchState::Idle)?;
                return Ok(Err(e));
            }
        };

        self.transition(WatchState::RunDownstream)?;
        let downstream = handler.run_downstream(&self.spec.downstream_tasks);
        self.transition(WatchState::Idle)?;

        match downstream {
            Ok(()) => {
                info!(files = report.copied.len(), "watch cycle finished");
                Ok(Ok(report))
            }
            Err(e) => {
                error!(error = %e, "downstream task failed; waiting for the next change");
                Ok(Err(e))
            }
        }
    }

    /// Pop everything queued right now, returning the number of changes
    fn drain(&mut self, events: &Receiver<WatchEvent>) -> usize {
        let mut changes = 0;
        while let Ok(event) = events.try_recv() {
            match event {
                WatchEvent::Changed(_) => changes += 1,
                WatchEvent::Error(message) => self.notifier_error(&message),
            }
        }
        changes
    }

    fn notifier_error(&mut self, message: &str) {
        self.summary.notifier_errors += 1;
        warn!(error = message, "filesystem watch error; still listening");
    }

    fn transition(&mut self, target: WatchState) -> Result<(), WatchError> {
        if !self.state.can_transition_to(target) {
            return Err(WatchError::InvalidTransition {
                from: self.state,
                to: target,
            });
        }
        debug!(from = %self.state, to = %target, "watch state");
        self.state = target;
        Ok(())
    }
}
