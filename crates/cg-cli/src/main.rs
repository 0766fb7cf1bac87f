//! CookieGate CLI
//!
//! CLI tool for checking cookie pattern configurations and replaying page
//! sessions against them.

mod logging;
mod simulate;

use std::fs;

use clap::{Parser, Subcommand};

use cg_compiler::{compile_patterns, parse_config};
use cg_core::{CookieJar, Diagnostics, EngineConfig};

use crate::simulate::{parse_script, Session};

#[derive(Parser)]
#[command(name = "cg-cli")]
#[command(about = "CookieGate configuration checker and page simulator")]
struct Cli {
    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a configuration and report its patterns
    Check {
        /// Configuration JSON file
        #[arg(short, long)]
        config: String,
    },

    /// Replay a page session script against an in-memory cookie store
    Simulate {
        /// Configuration JSON file
        #[arg(short, long)]
        config: String,

        /// Session script file
        #[arg(short, long)]
        script: String,

        /// Page hostname
        #[arg(long, default_value = "www.example.com")]
        host: String,

        /// Page path
        #[arg(long, default_value = "/")]
        path: String,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    let result = match cli.command {
        Commands::Check { config } => cmd_check(&config),
        Commands::Simulate {
            config,
            script,
            host,
            path,
        } => cmd_simulate(&config, &script, &host, &path),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn load_config(path: &str) -> Result<EngineConfig, String> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read '{}': {}", path, e))?;
    parse_config(&text).map_err(|e| format!("Failed to load '{}': {}", path, e))
}

fn cmd_check(path: &str) -> Result<(), String> {
    let config = load_config(path)?;
    let output = compile_patterns(&config.patterns, &Diagnostics::disabled());
    let stats = output.stats;

    println!("Config: {}", path);
    println!(
        "  Patterns:  {} total, {} active, {} disabled, {} empty, {} invalid",
        stats.total, stats.compiled, stats.disabled, stats.empty, stats.invalid
    );
    println!("  Logging:   {}", if config.enable_logging { "on" } else { "off" });
    println!("  Interval:  {}ms", config.sweep_interval.as_millis());

    if output.matchers.is_empty() {
        println!("  Engine:    inactive (no valid patterns)");
    } else {
        println!();
        println!("Active patterns:");
        for matcher in &output.matchers {
            println!("  {}", matcher.source());
        }
    }

    if output.errors.is_empty() {
        return Ok(());
    }

    println!();
    println!("Invalid patterns:");
    for error in &output.errors {
        println!("  #{} {}", error.index, error.pattern);
        for line in error.message.lines() {
            println!("      {}", line);
        }
    }

    Err(format!("{} invalid pattern(s) in '{}'", output.errors.len(), path))
}

fn cmd_simulate(config_path: &str, script_path: &str, host: &str, path: &str) -> Result<(), String> {
    let config = load_config(config_path)?;
    let script = fs::read_to_string(script_path)
        .map_err(|e| format!("Failed to read '{}': {}", script_path, e))?;
    let steps = parse_script(&script)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .map_err(|e| format!("Failed to start tokio runtime: {}", e))?;

    let jar = CookieJar::new(host).with_page_path(path);
    let summary = runtime.block_on(Session::new(config, jar, std::io::stdout()).run(&steps))?;

    println!();
    println!("Session: {}", script_path);
    println!("  Writes:    {} forwarded, {} blocked", summary.forwarded, summary.blocked);
    println!("  Sweeps:    {} ({} cookie(s) removed)", summary.sweeps, summary.removed);
    println!("  Cookies:   {}", summary.cookies);

    Ok(())
}
