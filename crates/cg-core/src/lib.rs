//! CookieGate Core Library
//!
//! This crate provides the cookie filtering engine for CookieGate. It sits
//! between page scripts and the page's cookie store, suppressing writes of
//! cookies whose names match a configured set of regular expressions and
//! periodically expiring matching cookies that slipped past.
//!
//! # Architecture
//!
//! The engine operates on a [`MatcherSet`] compiled once at startup (see the
//! `cg-compiler` crate). Two components read it for the rest of the page's
//! lifetime:
//!
//! - the gate, a passive wrapper that decides every script write, and
//! - the sweeper, an active pass that force-expires matching cookies through
//!   the original, unfiltered write path.
//!
//! # Modules
//!
//! - `types`: Configuration and result types
//! - `matcher`: Compiled cookie-name matchers
//! - `cookie`: Cookie string parsing helpers
//! - `domain`: Host/domain helpers backed by the Public Suffix List
//! - `store`: The cookie store abstraction (the original write path)
//! - `jar`: In-memory cookie store with script-visible semantics
//! - `gate`: Write interception
//! - `sweep`: Scan-and-expire cleanup
//! - `diagnostics`: Optional log output
//! - `engine`: Lifecycle tying it all together

pub mod cookie;
pub mod diagnostics;
pub mod domain;
pub mod engine;
pub mod gate;
pub mod jar;
pub mod matcher;
pub mod store;
pub mod sweep;
pub mod types;

// Re-export commonly used types
pub use diagnostics::Diagnostics;
pub use engine::Engine;
pub use gate::CookieGate;
pub use jar::CookieJar;
pub use matcher::{CompiledMatcher, MatcherSet};
pub use store::{CookieStore, StoreError};
pub use sweep::sweep;
pub use types::{EngineConfig, EngineState, PatternEntry, SweepReport, WriteDecision};
