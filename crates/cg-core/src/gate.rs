//! Write Interception
//!
//! The gate sits in front of the page's original cookie write path. Every
//! write is decided on the cookie name alone; allowed writes are forwarded
//! byte-for-byte so expiry, path, domain and flags stay exactly as the
//! caller wrote them. Reads are never filtered.

use crate::cookie::cookie_name;
use crate::diagnostics::Diagnostics;
use crate::matcher::{CompiledMatcher, MatcherSet};
use crate::store::{CookieStore, StoreError};
use crate::types::WriteDecision;

pub struct CookieGate<S> {
    matchers: MatcherSet,
    store: S,
    diagnostics: Diagnostics,
}

impl<S: CookieStore> CookieGate<S> {
    /// Wrap `store`, the captured original write path.
    pub fn new(matchers: MatcherSet, store: S, diagnostics: Diagnostics) -> Self {
        Self {
            matchers,
            store,
            diagnostics,
        }
    }

    /// Matcher that would block `assignment`, if any.
    #[inline]
    pub fn check(&self, assignment: &str) -> Option<&CompiledMatcher> {
        self.matchers.first_match(cookie_name(assignment))
    }

    /// Decide one write.
    ///
    /// A blocked write never touches the store and never fails. Errors are
    /// only those the original write path itself raises for a forwarded
    /// write.
    pub fn write(&self, assignment: &str) -> Result<WriteDecision, StoreError> {
        self.write_with(assignment, |assignment| self.store.write(assignment))
    }

    /// Decide one write, handing an allowed one to `forward` instead of the
    /// store. Whatever `forward` fails with is returned as is.
    pub fn write_with<E, F>(&self, assignment: &str, forward: F) -> Result<WriteDecision, E>
    where
        F: FnOnce(&str) -> Result<(), E>,
    {
        if let Some(matcher) = self.check(assignment) {
            let name = cookie_name(assignment);
            self.diagnostics.blocked(name, matcher.source());
            return Ok(WriteDecision::Blocked {
                name: name.to_string(),
                pattern: matcher.source().to_string(),
            });
        }

        forward(assignment)?;
        Ok(WriteDecision::Forwarded)
    }

    /// Unfiltered read.
    #[inline]
    pub fn read(&self) -> String {
        self.store.read()
    }

    pub fn matchers(&self) -> &MatcherSet {
        &self.matchers
    }

    /// The original write path, for cleanup that must bypass the gate.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }
}
