//! Core type definitions for CookieGate
//!
//! Configuration types are handed over by the delivery layer before the
//! engine starts and are never mutated by it.

use std::time::Duration;

/// Nominal period between two sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(5);

// =============================================================================
// Configuration
// =============================================================================

/// One configured cookie-name pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternEntry {
    /// Regular expression body, used as-is.
    pub pattern: String,
    pub enabled: bool,
    /// Free-form note from the settings layer. Ignored by the engine.
    pub description: Option<String>,
}

impl PatternEntry {
    pub fn new(pattern: impl Into<String>, enabled: bool) -> Self {
        Self {
            pattern: pattern.into(),
            enabled,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Everything the engine reads at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub patterns: Vec<PatternEntry>,
    pub enable_logging: bool,
    pub sweep_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            patterns: Vec::new(),
            enable_logging: false,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}

impl EngineConfig {
    pub fn new(patterns: Vec<PatternEntry>, enable_logging: bool) -> Self {
        Self {
            patterns,
            enable_logging,
            ..Self::default()
        }
    }

    /// Override the sweep period. A zero period falls back to the default.
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = if interval.is_zero() {
            DEFAULT_SWEEP_INTERVAL
        } else {
            interval
        };
        self
    }
}

// =============================================================================
// Lifecycle & Results
// =============================================================================

/// Engine lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineState {
    /// No matcher set has been produced yet
    Uninitialized,
    /// Gate installed, sweeps running
    Active,
    /// Matcher set came out empty; nothing is filtered, ever
    Inactive,
}

/// Verdict of the gate for one write attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteDecision {
    /// The original string went through the original write path.
    Forwarded,
    /// The write was dropped; the store is untouched.
    Blocked { name: String, pattern: String },
}

impl WriteDecision {
    #[inline]
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked { .. })
    }
}

/// Outcome of one sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Cookie entries found in the scanned string
    pub scanned: usize,
    /// Matching entries for which expiration was issued
    pub removed: usize,
    /// Distinct matching names, in scan order
    pub names: Vec<String>,
    /// Matching names still readable after the expiration writes
    pub survivors: Vec<String>,
}
