//! Page session simulator
//!
//! Replays a small script against an in-memory cookie jar, with the engine
//! installed at a chosen point and sweeps driven by a tokio interval, so a
//! configuration can be tried against realistic load orders:
//!
//! ```text
//! # a tracker that ran before the engine loaded
//! raw _ga_XYZ=GA1.1.1; path=/; domain=.example.com
//! start
//! set _ga_XYZ=GA1.1.2
//! set session_id=abc123
//! # a script that kept a reference to the original setter
//! raw _fbp=fb.1.2
//! wait 5000
//! dump
//! ```

use std::cell::RefCell;
use std::fmt;
use std::io::Write;
use std::rc::Rc;
use std::time::Duration;

use cg_compiler::compile_patterns;
use cg_core::{CookieJar, CookieStore, Diagnostics, Engine, EngineConfig, SweepReport, WriteDecision};
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

pub type SharedJar = Rc<RefCell<CookieJar>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Write through the original path, bypassing any gate
    Raw(String),
    /// Script write; gated once the engine is started
    Set(String),
    /// Install the engine (runs the first sweep)
    Start,
    /// Let time pass; periodic sweeps fire meanwhile
    Wait(Duration),
    /// Print the current cookie string
    Dump,
}

pub fn parse_script(text: &str) -> Result<Vec<Step>, String> {
    let mut steps = Vec::new();

    for (idx, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        let step = match command {
            "raw" => Step::Raw(require_assignment(rest, idx)?),
            "set" => Step::Set(require_assignment(rest, idx)?),
            "start" => Step::Start,
            "wait" => {
                let ms = rest
                    .parse::<u64>()
                    .map_err(|_| format!("line {}: invalid wait duration '{}'", idx + 1, rest))?;
                Step::Wait(Duration::from_millis(ms))
            }
            "dump" => Step::Dump,
            other => return Err(format!("line {}: unknown command '{}'", idx + 1, other)),
        };
        steps.push(step);
    }

    Ok(steps)
}

fn require_assignment(rest: &str, idx: usize) -> Result<String, String> {
    if rest.is_empty() {
        Err(format!("line {}: missing cookie assignment", idx + 1))
    } else {
        Ok(rest.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub blocked: usize,
    pub forwarded: usize,
    pub sweeps: usize,
    pub removed: usize,
    /// Cookie string at the end of the session
    pub cookies: String,
}

pub struct Session<W> {
    config: EngineConfig,
    jar: SharedJar,
    engine: Option<Engine<SharedJar>>,
    ticker: Option<Interval>,
    summary: SessionSummary,
    out: W,
}

impl<W: Write> Session<W> {
    pub fn new(config: EngineConfig, jar: CookieJar, out: W) -> Self {
        Self {
            config,
            jar: Rc::new(RefCell::new(jar)),
            engine: None,
            ticker: None,
            summary: SessionSummary::default(),
            out,
        }
    }

    pub async fn run(mut self, steps: &[Step]) -> Result<SessionSummary, String> {
        for step in steps {
            self.step(step).await?;
        }
        self.summary.cookies = self.jar.read();
        Ok(self.summary)
    }

    async fn step(&mut self, step: &Step) -> Result<(), String> {
        match step {
            Step::Raw(assignment) => {
                self.jar.write(assignment).map_err(|e| e.to_string())?;
                self.emit(format_args!("raw    {}", assignment))
            }
            Step::Set(assignment) => self.set(assignment),
            Step::Start => self.start(),
            Step::Wait(duration) => self.wait(*duration).await,
            Step::Dump => {
                let cookies = self.jar.read();
                self.emit(format_args!("dump   {}", cookies))
            }
        }
    }

    fn set(&mut self, assignment: &str) -> Result<(), String> {
        let decision = match &self.engine {
            Some(engine) => engine.write(assignment).map_err(|e| e.to_string())?,
            None => {
                self.jar.write(assignment).map_err(|e| e.to_string())?;
                WriteDecision::Forwarded
            }
        };

        match decision {
            WriteDecision::Forwarded => {
                self.summary.forwarded += 1;
                self.emit(format_args!("set    {}", assignment))
            }
            WriteDecision::Blocked { name, pattern } => {
                self.summary.blocked += 1;
                self.emit(format_args!("block  {} (matched {})", name, pattern))
            }
        }
    }

    fn start(&mut self) -> Result<(), String> {
        if self.engine.is_some() {
            return Err("engine already started".to_string());
        }

        let output = compile_patterns(&self.config.patterns, &Diagnostics::new(self.config.enable_logging));
        for error in &output.errors {
            tracing::warn!("{}", error);
        }

        let engine = Engine::install(&self.config, output.matchers, Rc::clone(&self.jar));
        self.emit(format_args!(
            "start  {:?} with {} pattern(s)",
            engine.state(),
            engine.matchers().len()
        ))?;

        if let Some(report) = engine.initial_sweep().cloned() {
            self.record(&report)?;
        }

        if engine.is_active() {
            let period = engine.sweep_interval();
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            self.ticker = Some(ticker);
        }

        self.engine = Some(engine);
        Ok(())
    }

    async fn wait(&mut self, duration: Duration) -> Result<(), String> {
        let deadline = time::sleep(duration);
        tokio::pin!(deadline);

        loop {
            let Some(ticker) = self.ticker.as_mut() else {
                deadline.await;
                return Ok(());
            };

            tokio::select! {
                biased;
                _ = ticker.tick() => {
                    if let Some(report) = self.engine.as_ref().and_then(Engine::tick) {
                        self.record(&report)?;
                    }
                }
                _ = &mut deadline => return Ok(()),
            }
        }
    }

    fn record(&mut self, report: &SweepReport) -> Result<(), String> {
        self.summary.sweeps += 1;
        self.summary.removed += report.removed;
        if report.removed > 0 {
            self.emit(format_args!(
                "sweep  removed {}: {}",
                report.removed,
                report.names.join(", ")
            ))?;
        }
        if !report.survivors.is_empty() {
            self.emit(format_args!("sweep  could not remove: {}", report.survivors.join(", ")))?;
        }
        Ok(())
    }

    fn emit(&mut self, line: fmt::Arguments<'_>) -> Result<(), String> {
        writeln!(self.out, "{}", line).map_err(|e| format!("Failed to write output: {}", e))
    }
}
