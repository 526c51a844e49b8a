//! JSONL activity log: append-only line-delimited JSON describing the run.
//!
//! Each line is a self-contained JSON object, assembled in memory and written
//! with a single `write_all` so a concurrent `tail -f` never sees half a line.
//!
//! Degradation chain:
//! 1. Configured file path
//! 2. stderr with `[DW-JSONL]` prefix
//! 3. Silent discard (the monitoring loop never stops for logging failures)

#![allow(missing_docs)]

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::core::errors::{DwError, Result};

/// Severity level for log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

/// Event type identifiers written to the `event` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    RunStart,
    RunStop,
    StyleChange,
    DiffToggle,
    HeuristicChange,
    Repaint,
    ChildExit,
    Error,
}

/// A single JSONL log entry. Only `ts`, `event` and `severity` are always present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// ISO 8601 UTC timestamp.
    pub ts: String,
    pub event: EventType,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tick: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff_mode: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heuristic: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl LogEntry {
    /// Create a new entry stamped with the current UTC time.
    pub fn new(event: EventType, severity: Severity) -> Self {
        Self {
            ts: format_utc_now(),
            event,
            severity,
            command: None,
            tick: None,
            style: None,
            diff_mode: None,
            heuristic: None,
            exit_code: None,
            error_code: None,
            details: None,
        }
    }
}

/// Run-level events, converted into [`LogEntry`] rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityEvent {
    RunStarted {
        version: String,
        config_hash: String,
        commands: Vec<String>,
    },
    RunStopped {
        ticks: u64,
        reason: String,
    },
    StyleChanged {
        style: String,
    },
    DiffToggled {
        diff_mode: bool,
    },
    HeuristicChanged {
        level: usize,
    },
    Repaint,
    ChildExited {
        command: String,
        tick: u64,
        exit_code: Option<i32>,
        details: String,
    },
    Error {
        code: String,
        message: String,
    },
}

impl ActivityEvent {
    #[must_use]
    pub fn to_entry(&self) -> LogEntry {
        match self {
            Self::RunStarted {
                version,
                config_hash,
                commands,
            } => {
                let mut e = LogEntry::new(EventType::RunStart, Severity::Info);
                e.command = Some(commands.join(" | "));
                e.details = Some(format!("version={version} config_hash={config_hash}"));
                e
            }
            Self::RunStopped { ticks, reason } => {
                let mut e = LogEntry::new(EventType::RunStop, Severity::Info);
                e.tick = Some(*ticks);
                e.details = Some(reason.clone());
                e
            }
            Self::StyleChanged { style } => {
                let mut e = LogEntry::new(EventType::StyleChange, Severity::Info);
                e.style = Some(style.clone());
                e
            }
            Self::DiffToggled { diff_mode } => {
                let mut e = LogEntry::new(EventType::DiffToggle, Severity::Info);
                e.diff_mode = Some(*diff_mode);
                e
            }
            Self::HeuristicChanged { level } => {
                let mut e = LogEntry::new(EventType::HeuristicChange, Severity::Info);
                e.heuristic = Some(*level);
                e
            }
            Self::Repaint => LogEntry::new(EventType::Repaint, Severity::Info),
            Self::ChildExited {
                command,
                tick,
                exit_code,
                details,
            } => {
                let mut e = LogEntry::new(EventType::ChildExit, Severity::Warning);
                e.command = Some(command.clone());
                e.tick = Some(*tick);
                e.exit_code = *exit_code;
                e.details = Some(details.clone());
                e
            }
            Self::Error { code, message } => {
                let mut e = LogEntry::new(EventType::Error, Severity::Critical);
                e.error_code = Some(code.clone());
                e.details = Some(message.clone());
                e
            }
        }
    }
}

/// Degradation state of the JSONL writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriterState {
    Normal,
    Stderr,
    Discard,
}

/// Append-only JSONL writer with stderr fallback.
pub struct JsonlWriter {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    state: WriterState,
}

impl JsonlWriter {
    /// Open the log file. Falls back to stderr on failure.
    pub fn open(path: &Path) -> Self {
        match open_append(path) {
            Ok(file) => Self {
                path: path.to_path_buf(),
                writer: Some(BufWriter::new(file)),
                state: WriterState::Normal,
            },
            Err(e) => {
                let _ = writeln!(io::stderr(), "[DW-JSONL] {e}, using stderr");
                Self {
                    path: path.to_path_buf(),
                    writer: None,
                    state: WriterState::Stderr,
                }
            }
        }
    }

    /// Write a single log entry as one JSONL line and flush it.
    pub fn write_entry(&mut self, entry: &LogEntry) {
        let line = match serde_json::to_string(entry) {
            Ok(json) => format!("{json}\n"),
            Err(e) => {
                let _ = writeln!(io::stderr(), "[DW-JSONL] serialize error: {e}");
                return;
            }
        };
        self.write_line(&line);
    }

    /// Current degradation state.
    pub fn state(&self) -> &str {
        match self.state {
            WriterState::Normal => "normal",
            WriterState::Stderr => "stderr",
            WriterState::Discard => "discard",
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_line(&mut self, line: &str) {
        match self.state {
            WriterState::Normal => {
                let ok = self
                    .writer
                    .as_mut()
                    .is_some_and(|w| w.write_all(line.as_bytes()).and_then(|()| w.flush()).is_ok());
                if !ok {
                    self.writer = None;
                    self.state = WriterState::Stderr;
                    let _ = writeln!(io::stderr(), "[DW-JSONL] write failed, using stderr");
                    self.write_line(line);
                }
            }
            WriterState::Stderr => {
                if write!(io::stderr(), "[DW-JSONL] {line}").is_err() {
                    self.state = WriterState::Discard;
                }
            }
            WriterState::Discard => {}
        }
    }
}

/// Cheaply cloneable, possibly disabled handle on a shared [`JsonlWriter`].
///
/// Shared between the scheduler and the signal thread.
#[derive(Clone, Default)]
pub struct ActivityLog {
    writer: Option<Arc<Mutex<JsonlWriter>>>,
}

impl ActivityLog {
    /// A handle that drops every event.
    #[must_use]
    pub fn disabled() -> Self {
        Self { writer: None }
    }

    /// Log to `path`, or nowhere when `None`.
    #[must_use]
    pub fn open(path: Option<&Path>) -> Self {
        Self {
            writer: path.map(|p| Arc::new(Mutex::new(JsonlWriter::open(p)))),
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.writer.is_some()
    }

    pub fn record(&self, event: &ActivityEvent) {
        if let Some(writer) = &self.writer {
            writer.lock().write_entry(&event.to_entry());
        }
    }
}

// ──────────────────────── helpers ────────────────────────

/// Open or create a file for appending, creating its parent directory.
fn open_append(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| DwError::io(parent, source))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| DwError::io(path, source))
}

/// Format current UTC time as ISO 8601.
fn format_utc_now() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

// ──────────────────────── tests ────────────────────────
