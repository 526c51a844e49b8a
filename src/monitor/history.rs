//! History cache: per-line frames persisted across ticks, elementwise deltas.

#![allow(missing_docs)]

use std::collections::HashMap;
use std::ops::Range;

use crate::fields::ParsedLine;

/// Positional key of a line within one tick's concatenated output.
pub type LineId = usize;

/// What the cache remembers about a line after the most recent tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub fingerprint: u64,
    pub ranges: Vec<Range<usize>>,
    pub values: Vec<i64>,
}

impl From<&ParsedLine> for Frame {
    fn from(parsed: &ParsedLine) -> Self {
        Self {
            fingerprint: parsed.fingerprint,
            ranges: parsed.ranges.clone(),
            values: parsed.values.clone(),
        }
    }
}

/// How a line compares with its previous frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Same skeleton and field count: the delta is meaningful.
    Same,
    /// No frame stored for this identity yet.
    FirstSight,
    /// The line carries no numeric fields this tick.
    NoFields,
    /// The non-numeric skeleton changed.
    Reshaped,
    /// Same skeleton but a different number of fields.
    FieldCount,
}

impl Shape {
    /// Lines in these shapes are shown verbatim, without annotations.
    #[must_use]
    pub const fn is_passthrough(self) -> bool {
        matches!(self, Self::FirstSight | Self::NoFields | Self::Reshaped)
    }
}

/// Result of feeding one line into the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub shape: Shape,
    /// `current - previous` per field, all zero unless the counts match.
    pub delta: Vec<i64>,
}

/// Frames keyed by line identity, kept for the lifetime of the run.
///
/// Entries are overwritten every tick and never evicted, so memory follows
/// the largest line count any tick produced.
#[derive(Debug, Default)]
pub struct HistoryCache {
    frames: HashMap<LineId, Frame>,
}

impl HistoryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare `frame` with what is stored for `id`, then replace it.
    pub fn update(&mut self, id: LineId, frame: Frame) -> Observation {
        let previous = self.frames.get(&id);

        let shape = match previous {
            None => Shape::FirstSight,
            Some(_) if frame.ranges.is_empty() => Shape::NoFields,
            Some(prev) if prev.fingerprint != frame.fingerprint => Shape::Reshaped,
            Some(prev) if prev.ranges.len() != frame.ranges.len() => Shape::FieldCount,
            Some(_) => Shape::Same,
        };

        let delta = match previous {
            Some(prev) if prev.values.len() == frame.values.len() => frame
                .values
                .iter()
                .zip(&prev.values)
                .map(|(current, before)| current.wrapping_sub(*before))
                .collect(),
            _ => vec![0; frame.values.len()],
        };

        self.frames.insert(id, frame);
        Observation { shape, delta }
    }

    /// Number of identities seen so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
