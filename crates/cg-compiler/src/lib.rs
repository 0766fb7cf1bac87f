//! CookieGate Pattern Compiler
//!
//! This crate turns the delivery layer's configuration into the matcher set
//! the engine runs on.

pub mod compiler;
pub mod config;

pub use compiler::{compile_pattern, compile_patterns, CompileOutput, CompileStats, PatternError};
pub use config::{config_from_value, parse_config, ConfigError};
