//! Optional log output
//!
//! Every component receives the same [`Diagnostics`] handle. When disabled
//! it emits nothing at all; when enabled it writes human-readable lines to
//! the `log` facade under the `cookie_gate` target. Whatever backend the host
//! installs (console, tracing, none) cannot fail the caller.

use std::fmt::Display;

use crate::matcher::MatcherSet;
use crate::types::SweepReport;

pub const LOG_TARGET: &str = "cookie_gate";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Diagnostics {
    enabled: bool,
}

impl Diagnostics {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn disabled() -> Self {
        Self { enabled: false }
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn compile_failed(&self, pattern: &str, error: &dyn Display) {
        if self.enabled {
            log::warn!(target: LOG_TARGET, "Invalid regex pattern: {pattern} ({error})");
        }
    }

    pub fn active(&self, matchers: &MatcherSet) {
        if self.enabled {
            log::info!(
                target: LOG_TARGET,
                "Cookie Gate active with {} pattern(s): {:?}",
                matchers.len(),
                matchers.sources()
            );
        }
    }

    pub fn inactive(&self) {
        if self.enabled {
            log::info!(target: LOG_TARGET, "No valid patterns to block - Cookie Gate inactive");
        }
    }

    pub fn blocked(&self, name: &str, pattern: &str) {
        if self.enabled {
            log::info!(target: LOG_TARGET, "Blocked cookie: {name} (matched {pattern})");
        }
    }

    pub fn swept(&self, report: &SweepReport) {
        if !self.enabled {
            return;
        }
        if report.removed > 0 {
            log::info!(
                target: LOG_TARGET,
                "Removed {} blocked cookie(s): {}",
                report.removed,
                report.names.join(", ")
            );
        }
        if !report.survivors.is_empty() {
            log::warn!(
                target: LOG_TARGET,
                "Could not remove cookie(s) with unknown domain/path: {}",
                report.survivors.join(", ")
            );
        }
    }

    pub fn install_failed(&self, reason: &dyn Display) {
        if self.enabled {
            log::warn!(target: LOG_TARGET, "Cookie Gate not installed: {reason}");
        }
    }
}
