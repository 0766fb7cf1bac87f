//! Logging initialization
//!
//! Engine diagnostics go through the `log` facade; the subscriber's log
//! bridge picks them up alongside the CLI's own tracing events.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub fn init(verbose: u8) -> Result<(), String> {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbose >= 1),
        )
        .try_init()
        .map_err(|e| format!("Failed to initialize logging: {}", e))
}
