//! Trace sink: one tab-separated row per tick.
//!
//! Row layout: the tick index, then one column per numeric field across
//! every line of every command, in encounter order.

#![allow(missing_docs)]
#![allow(clippy::cast_precision_loss)]

use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::errors::{DwError, Result};

/// Which number a trace column carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum TraceValues {
    /// Field value as read; every line with fields contributes.
    Raw,
    /// Change since the previous tick; only lines with a usable baseline.
    #[default]
    Delta,
    /// Change per second; only lines with a usable baseline.
    Rate,
}

/// Tab-separated trace writer.
pub struct TraceWriter<W: Write> {
    out: W,
    values: TraceValues,
    interval: Duration,
    row: String,
    path: Option<PathBuf>,
}

impl TraceWriter<BufWriter<File>> {
    /// Create (truncating) the trace file at `path`.
    pub fn create(path: &Path, values: TraceValues, interval: Duration) -> Result<Self> {
        let file = File::create(path).map_err(|source| DwError::io(path, source))?;
        let mut writer = Self::new(BufWriter::new(file), values, interval);
        writer.path = Some(path.to_path_buf());
        Ok(writer)
    }
}

impl<W: Write> TraceWriter<W> {
    pub fn new(out: W, values: TraceValues, interval: Duration) -> Self {
        Self {
            out,
            values,
            interval,
            row: String::new(),
            path: None,
        }
    }

    /// Start the row for `tick`.
    pub fn begin_row(&mut self, tick: u64) {
        self.row.clear();
        let _ = write!(self.row, "{tick}");
    }

    /// Append the columns for one line.
    ///
    /// `delta` is `None` for lines without a usable baseline; those only
    /// contribute in [`TraceValues::Raw`] mode.
    pub fn push_line(&mut self, values: &[i64], delta: Option<&[i64]>) {
        match (self.values, delta) {
            (TraceValues::Raw, _) => {
                for v in values {
                    let _ = write!(self.row, "\t{v}");
                }
            }
            (TraceValues::Delta, Some(delta)) => {
                for d in delta {
                    let _ = write!(self.row, "\t{d}");
                }
            }
            (TraceValues::Rate, Some(delta)) => {
                let secs = self.interval.as_secs_f64();
                for d in delta {
                    let rate = if secs > f64::EPSILON { *d as f64 / secs } else { 0.0 };
                    let _ = write!(self.row, "\t{rate}");
                }
            }
            (_, None) => {}
        }
    }

    /// Terminate and flush the row.
    pub fn end_row(&mut self) -> Result<()> {
        self.row.push('\n');
        let path = self.path.clone().unwrap_or_else(|| PathBuf::from("<trace>"));
        self.out
            .write_all(self.row.as_bytes())
            .and_then(|()| self.out.flush())
            .map_err(|source| DwError::io(path, source))
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
