//! Top-level CLI definition and dispatch.

use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{CommandFactory, Parser};
use clap_complete::{Shell as CompletionShell, generate};
use colored::control;
use thiserror::Error;

use dwatch::core::config::Config;
use dwatch::core::errors::DwError;
use dwatch::daemon::loop_main::{StopReason, TickScheduler};
use dwatch::daemon::runner::ShellRunner;
use dwatch::daemon::signals::StyleState;
use dwatch::logger::jsonl::ActivityLog;
use dwatch::logger::trace::TraceValues;
use dwatch::platform::process::{daemonize, pin_to_cpu};
use dwatch::render::display::LayoutKind;
use dwatch::render::styles::Style;

/// dwatch — run commands periodically and highlight how their numbers move.
#[derive(Debug, Parser)]
#[command(
    name = "dwatch",
    author,
    version,
    about = "Watch commands and annotate the numbers that change between runs",
    long_about = None
)]
pub struct Cli {
    /// Seconds between ticks (fractions allowed).
    #[arg(short, long, value_name = "SECONDS")]
    interval: Option<f64>,
    /// Stop after this many ticks.
    #[arg(short = 'n', long, value_name = "TICKS")]
    count: Option<u64>,
    /// Hide the banner line.
    #[arg(short = 'b', long)]
    no_banner: bool,
    /// Hide lines whose numbers are all zero.
    #[arg(short = 'z', long)]
    drop_zero: bool,
    /// Start in diff mode (enables the delta and rate styles).
    #[arg(short, long)]
    diff: bool,
    /// Separator heuristic level (0 = minimal, 1 = extended).
    #[arg(short = 'H', long, value_name = "LEVEL")]
    heuristic: Option<usize>,
    /// Initial style (see --list-styles).
    #[arg(short, long, value_name = "NAME")]
    style: Option<String>,
    /// Write one tab-separated row per tick to this file.
    #[arg(short, long, value_name = "PATH")]
    trace: Option<PathBuf>,
    /// What the trace columns carry.
    #[arg(long, value_enum, value_name = "KIND")]
    trace_values: Option<TraceValues>,
    /// Treat every positional argument as its own command.
    #[arg(short, long)]
    multiple_commands: bool,
    /// Draw commands side by side in columns of this width.
    #[arg(long, value_name = "WIDTH")]
    tab: Option<u16>,
    /// Pin dwatch and its commands to this CPU core.
    #[arg(long, value_name = "CORE")]
    cpu: Option<usize>,
    /// Detach from the terminal (requires --trace).
    #[arg(long)]
    daemon: bool,
    /// Override config file path.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Append JSONL activity events to this file.
    #[arg(long, value_name = "PATH")]
    activity_log: Option<PathBuf>,
    /// Disable colored output.
    #[arg(long)]
    no_color: bool,
    /// List the available styles and exit.
    #[arg(long)]
    list_styles: bool,
    /// Print a shell completion script and exit.
    #[arg(long, value_enum, value_name = "SHELL")]
    completions: Option<CompletionShell>,
    /// Command to watch (joined with spaces unless -m is given).
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "COMMAND")]
    command: Vec<String>,
}

/// CLI error type with explicit exit-code mapping.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input or configuration.
    #[error("{0}")]
    User(String),
    /// Environment/runtime failure.
    #[error("{0}")]
    Runtime(String),
    /// Internal bug or invariant violation.
    #[error("{0}")]
    Internal(String),
    /// Output write failed.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    /// Process exit code contract for the CLI.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::User(_) => 1,
            Self::Runtime(_) | Self::Io(_) => 2,
            Self::Internal(_) => 3,
        }
    }
}

impl From<DwError> for CliError {
    fn from(error: DwError) -> Self {
        if error.is_config() {
            Self::User(error.to_string())
        } else if error.is_internal() {
            Self::Internal(error.to_string())
        } else {
            Self::Runtime(error.to_string())
        }
    }
}

/// Parse-independent entry point.
pub fn run(cli: &Cli) -> Result<(), CliError> {
    if cli.no_color {
        control::set_override(false);
    }

    if let Some(shell) = cli.completions {
        let mut command = Cli::command();
        let binary_name = command.get_name().to_string();
        generate(shell, &mut command, binary_name, &mut io::stdout());
        return Ok(());
    }
    if cli.list_styles {
        return list_styles(&mut io::stdout().lock());
    }

    let commands = commands(cli)?;
    let mut config = Config::load(cli.config.as_deref())?;
    apply_cli_overrides(cli, &mut config)?;
    config.validate()?;

    if !config.watch.color {
        control::set_override(false);
    }
    if let Some(core) = config.process.cpu {
        pin_to_cpu(core)?;
    }
    // Fork before any thread exists.
    if config.process.daemon {
        daemonize()?;
    }

    let activity = ActivityLog::open(config.paths.activity_log.as_deref());
    let state = Arc::new(StyleState::new(
        config.initial_style().index(),
        config.initial_diff_mode(),
        config.watch.heuristic_level,
    ));

    let (events_tx, events_rx) = crossbeam_channel::unbounded();
    #[cfg(feature = "signals")]
    let _signals = dwatch::daemon::signals::SignalHandler::spawn(
        Arc::clone(&state),
        events_tx,
        activity.clone(),
    )?;
    #[cfg(not(feature = "signals"))]
    drop(events_tx);

    let out: Box<dyn Write> = if config.process.daemon {
        Box::new(io::sink())
    } else {
        Box::new(BufWriter::new(io::stdout()))
    };
    let runner = ShellRunner::new(config.process.shell.clone());
    let mut scheduler = TickScheduler::new(&config, commands, runner, out, state, activity)?;
    let reason = scheduler.run(&events_rx)?;
    if reason == StopReason::Shutdown {
        eprintln!("[DW-RUN] stopped after {} ticks", scheduler.ticks());
    }
    Ok(())
}

/// Commands to run each tick.
fn commands(cli: &Cli) -> Result<Vec<String>, CliError> {
    if cli.command.is_empty() {
        return Err(CliError::User(
            "missing command to watch (see --help)".to_string(),
        ));
    }
    if cli.multiple_commands {
        Ok(cli.command.clone())
    } else {
        Ok(vec![cli.command.join(" ")])
    }
}

/// Merge command-line flags over the file/env configuration.
fn apply_cli_overrides(cli: &Cli, config: &mut Config) -> Result<(), CliError> {
    let w = &mut config.watch;
    if let Some(secs) = cli.interval {
        w.interval_ms = interval_ms(secs)?;
    }
    if let Some(count) = cli.count {
        w.count = Some(count);
    }
    if cli.no_banner {
        w.banner = false;
    }
    if cli.drop_zero {
        w.drop_zero = true;
    }
    if cli.diff {
        w.diff_mode = true;
    }
    if let Some(level) = cli.heuristic {
        w.heuristic_level = level;
    }
    if let Some(style) = &cli.style {
        w.style = Some(style.clone());
    }
    if let Some(width) = cli.tab {
        w.layout = LayoutKind::Tab;
        w.tab_width = width;
    }
    if cli.no_color {
        w.color = false;
    }

    if let Some(path) = &cli.trace {
        config.trace.path = Some(path.clone());
    }
    if let Some(values) = cli.trace_values {
        config.trace.values = values;
    }
    if let Some(core) = cli.cpu {
        config.process.cpu = Some(core);
    }
    if cli.daemon {
        config.process.daemon = true;
    }
    if let Some(path) = &cli.activity_log {
        config.paths.activity_log = Some(path.clone());
    }
    Ok(())
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn interval_ms(secs: f64) -> Result<u64, CliError> {
    if !secs.is_finite() || secs <= 0.0 {
        return Err(CliError::User(format!(
            "interval must be a positive number of seconds, got {secs}"
        )));
    }
    let millis = (secs * 1000.0).round();
    if millis < 1.0 {
        return Err(CliError::User(format!(
            "interval {secs}s is below the 1ms resolution"
        )));
    }
    Ok(millis as u64)
}

fn list_styles(out: &mut impl Write) -> Result<(), CliError> {
    for style in Style::ALL {
        let marker = if style.needs_diff_mode() { "  (diff)" } else { "" };
        writeln!(
            out,
            "{}  {:<12} {}{marker}",
            style.index(),
            style.name(),
            style.description()
        )?;
    }
    Ok(())
}
