//! Engine lifecycle
//!
//! One [`Engine`] is constructed per page load, at a point the host chooses
//! (as early as possible). Construction is the `Uninitialized` to
//! `Active`/`Inactive` transition; there is no way back. Teardown is dropping
//! the engine and whatever sweep timer the host runs.

use std::time::Duration;

use crate::diagnostics::Diagnostics;
use crate::gate::CookieGate;
use crate::matcher::MatcherSet;
use crate::store::{CookieStore, StoreError};
use crate::sweep::sweep;
use crate::types::{EngineConfig, EngineState, SweepReport, WriteDecision};

pub struct Engine<S> {
    state: EngineState,
    gate: CookieGate<S>,
    sweep_interval: Duration,
    initial_sweep: Option<SweepReport>,
}

impl<S: CookieStore> Engine<S> {
    /// Install the engine over `store`, the page's original cookie path.
    ///
    /// With an empty matcher set the engine is permanently inactive: writes
    /// pass straight through and no sweep ever runs. Otherwise the first
    /// sweep runs right here, before any further page script.
    pub fn install(config: &EngineConfig, matchers: MatcherSet, store: S) -> Self {
        let diagnostics = Diagnostics::new(config.enable_logging);
        let state = if matchers.is_empty() {
            EngineState::Inactive
        } else {
            EngineState::Active
        };

        let mut engine = Self {
            state,
            gate: CookieGate::new(matchers, store, diagnostics),
            sweep_interval: config.sweep_interval,
            initial_sweep: None,
        };

        if engine.is_active() {
            engine.initial_sweep = Some(engine.sweep_now());
        }
        engine
    }

    #[inline]
    pub fn state(&self) -> EngineState {
        self.state
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.state == EngineState::Active
    }

    /// Script-facing write.
    pub fn write(&self, assignment: &str) -> Result<WriteDecision, StoreError> {
        self.write_with(assignment, |assignment| self.gate.store().write(assignment))
    }

    /// Script-facing write whose allowed assignments go through `forward`,
    /// for hosts that must call the original setter on the caller's own
    /// receiver.
    pub fn write_with<E, F>(&self, assignment: &str, forward: F) -> Result<WriteDecision, E>
    where
        F: FnOnce(&str) -> Result<(), E>,
    {
        if !self.is_active() {
            forward(assignment)?;
            return Ok(WriteDecision::Forwarded);
        }
        self.gate.write_with(assignment, forward)
    }

    /// Script-facing read, never filtered.
    pub fn read(&self) -> String {
        self.gate.read()
    }

    /// Periodic sweep. `None` when the engine is inactive.
    pub fn tick(&self) -> Option<SweepReport> {
        self.is_active().then(|| self.sweep_now())
    }

    pub fn sweep_interval(&self) -> Duration {
        self.sweep_interval
    }

    /// Report of the sweep run during installation.
    pub fn initial_sweep(&self) -> Option<&SweepReport> {
        self.initial_sweep.as_ref()
    }

    pub fn matchers(&self) -> &MatcherSet {
        self.gate.matchers()
    }

    pub fn store(&self) -> &S {
        self.gate.store()
    }

    fn sweep_now(&self) -> SweepReport {
        sweep(self.gate.store(), self.gate.matchers(), self.gate.diagnostics())
    }
}
