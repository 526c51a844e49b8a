//! Process runner: spawn a shell command and stream its stdout line by line.

#![allow(missing_docs)]

use std::io::Read;
use std::os::unix::process::{CommandExt, ExitStatusExt};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};

use crate::core::errors::{DwError, Result};

/// How a finished command exited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitClass {
    Success,
    /// Non-zero exit that is shown inline and otherwise ignored.
    Failed(i32),
    /// Exit that ends the run; carries a description of the status.
    Fatal(String),
}

impl ExitClass {
    /// Classify a raw exit code / terminating signal pair.
    ///
    /// Signals and the shell's "usage" (2), "not executable" (126) and
    /// "not found" (127) codes are fatal.
    #[must_use]
    pub fn classify(code: Option<i32>, signal: Option<i32>) -> Self {
        match (code, signal) {
            (Some(0), _) => Self::Success,
            (Some(c @ (2 | 126 | 127)), _) => Self::Fatal(format!("exit status {c}")),
            (Some(c), _) => Self::Failed(c),
            (None, Some(sig)) => Self::Fatal(format!("terminated by signal {sig}")),
            (None, None) => Self::Fatal("unknown exit status".to_string()),
        }
    }

    #[must_use]
    pub fn from_status(status: ExitStatus) -> Self {
        Self::classify(status.code(), status.signal())
    }

}

/// Source of command output lines.
///
/// `on_line` receives each line with its terminator stripped. An error from
/// `on_line` stops reading, reaps the child and is returned as is.
pub trait ProcessRunner {
    fn run(&self, command: &str, on_line: &mut dyn FnMut(&str) -> Result<()>) -> Result<ExitClass>;
}

/// Runs commands through `<shell> -c <command>`.
///
/// Each child leads its own process group: keyboard signals sent to the
/// terminal's foreground group reach dwatch and never the command.
#[derive(Debug, Clone)]
pub struct ShellRunner {
    shell: PathBuf,
}

impl ShellRunner {
    pub fn new(shell: impl Into<PathBuf>) -> Self {
        Self {
            shell: shell.into(),
        }
    }
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self::new("/bin/sh")
    }
}

impl ProcessRunner for ShellRunner {
    fn run(&self, command: &str, on_line: &mut dyn FnMut(&str) -> Result<()>) -> Result<ExitClass> {
        let mut child = Command::new(&self.shell)
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .process_group(0)
            .spawn()
            .map_err(|source| DwError::Spawn {
                command: command.to_string(),
                source,
            })?;

        let streamed = stream_lines(&mut child, command, on_line);
        if streamed.is_err() {
            let _ = child.kill();
        }
        let status = child.wait().map_err(|source| DwError::Wait {
            command: command.to_string(),
            source,
        })?;
        streamed?;
        Ok(ExitClass::from_status(status))
    }
}

fn stream_lines(
    child: &mut Child,
    command: &str,
    on_line: &mut dyn FnMut(&str) -> Result<()>,
) -> Result<()> {
    let Some(mut stdout) = child.stdout.take() else {
        return Ok(());
    };
    let mut splitter = LineSplitter::default();
    let mut chunk = [0_u8; 8192];
    loop {
        let n = match stdout.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(source) => {
                return Err(DwError::Wait {
                    command: command.to_string(),
                    source,
                });
            }
        };
        splitter.feed(&chunk[..n], on_line)?;
    }
    splitter.finish(on_line)
}

/// Incremental newline splitter over raw bytes.
#[derive(Debug, Default)]
pub struct LineSplitter {
    pending: Vec<u8>,
}

impl LineSplitter {
    /// Emit every complete line in `pending + bytes`, keeping the remainder.
    pub fn feed(&mut self, bytes: &[u8], on_line: &mut dyn FnMut(&str) -> Result<()>) -> Result<()> {
        self.pending.extend_from_slice(bytes);
        let mut start = 0;
        while let Some(pos) = memchr::memchr(b'\n', &self.pending[start..]) {
            let end = start + pos;
            emit(&self.pending[start..end], on_line)?;
            start = end + 1;
        }
        self.pending.drain(..start);
        Ok(())
    }

    /// Emit an unterminated last line, if any.
    pub fn finish(&mut self, on_line: &mut dyn FnMut(&str) -> Result<()>) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let rest = std::mem::take(&mut self.pending);
        emit(&rest, on_line)
    }
}

fn emit(raw: &[u8], on_line: &mut dyn FnMut(&str) -> Result<()>) -> Result<()> {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    on_line(&String::from_utf8_lossy(raw))
}
