//! Display sink: banner plus rendered lines, positioned with `crossterm`.
//!
//! Two layouts: `Full` repaints the screen top to bottom, erasing the tail
//! of every line; `Tab` places each command in its own column starting just
//! below the banner.

#![allow(missing_docs)]

use std::io::{self, Write};
use std::time::Duration;

use crossterm::cursor::{MoveTo, Show};
use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};
use serde::{Deserialize, Serialize};

use crate::daemon::signals::StyleSnapshot;

/// Screen layout for the rendered output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutKind {
    Full,
    Tab,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Full,
    Tab { width: u16 },
}

/// Cursor-positioned writer for one frame per tick.
pub struct Display<W: Write> {
    out: W,
    layout: Layout,
    repaint: bool,
    body_row: u16,
    row: u16,
    column: u16,
}

impl<W: Write> Display<W> {
    pub fn new(out: W, layout: Layout) -> Self {
        Self {
            out,
            layout,
            repaint: true,
            body_row: 0,
            row: 0,
            column: 0,
        }
    }

    /// Ask for a full clear on the next frame.
    pub fn request_repaint(&mut self) {
        self.repaint = true;
    }

    /// Start a frame, optionally with a banner line.
    pub fn begin_frame(&mut self, banner: Option<&str>) -> io::Result<()> {
        if self.repaint || matches!(self.layout, Layout::Tab { .. }) {
            queue!(self.out, Clear(ClearType::All))?;
            self.repaint = false;
        }
        queue!(self.out, MoveTo(0, 0))?;
        self.row = 0;
        self.column = 0;

        if let Some(text) = banner {
            write!(self.out, "{text}")?;
            queue!(self.out, Clear(ClearType::UntilNewLine))?;
            writeln!(self.out)?;
            writeln!(self.out)?;
            self.row = 2;
        }
        self.body_row = self.row;
        Ok(())
    }

    /// Move to the area of command `index` (only meaningful for `Tab`).
    pub fn begin_command(&mut self, index: usize) {
        if let Layout::Tab { width } = self.layout {
            let index = u16::try_from(index).unwrap_or(u16::MAX);
            self.column = index.saturating_mul(width);
            self.row = self.body_row;
        }
    }

    pub fn write_line(&mut self, text: &str) -> io::Result<()> {
        match self.layout {
            Layout::Full => {
                write!(self.out, "{text}")?;
                queue!(self.out, Clear(ClearType::UntilNewLine))?;
                writeln!(self.out)?;
            }
            Layout::Tab { .. } => {
                queue!(self.out, MoveTo(self.column, self.row))?;
                write!(self.out, "{text}")?;
            }
        }
        self.row = self.row.saturating_add(1);
        Ok(())
    }

    /// Finish the frame, erasing whatever the previous frame left below.
    pub fn end_frame(&mut self) -> io::Result<()> {
        if self.layout == Layout::Full {
            queue!(self.out, Clear(ClearType::FromCursorDown))?;
        }
        self.out.flush()
    }

    /// Leave the cursor visible below the last frame.
    pub fn finish(&mut self) -> io::Result<()> {
        if let Layout::Tab { .. } = self.layout {
            queue!(self.out, MoveTo(0, self.row.saturating_add(1)))?;
        }
        queue!(self.out, Show)?;
        self.out.flush()
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Banner line: interval, commands and the active mode indices.
#[must_use]
pub fn banner(
    interval: Duration,
    commands: &[String],
    snapshot: &StyleSnapshot,
    trace: Option<&str>,
) -> String {
    let quoted: Vec<String> = commands.iter().map(|c| format!("'{c}'")).collect();
    let style = snapshot.style();
    let mut text = format!(
        "Every {}: {} [diff:{} style:{}({}) heuristic:{}]",
        human_interval(interval),
        quoted.join(" | "),
        if snapshot.diff_mode { "on" } else { "off" },
        style.index(),
        style,
        snapshot.heuristic.level(),
    );
    if let Some(path) = trace {
        text.push_str(&format!(" trace:{path}"));
    }
    text
}

fn human_interval(interval: Duration) -> String {
    let millis = interval.as_millis();
    if millis % 1000 == 0 {
        format!("{}s", millis / 1000)
    } else {
        format!("{millis}ms")
    }
}
