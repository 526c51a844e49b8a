//! Numeric field location: separator heuristic, tokenizer, range algebra,
//! value extraction and structural fingerprinting.

pub mod extract;
pub mod fingerprint;
pub mod heuristic;
pub mod ranges;
pub mod tokenizer;

use std::ops::Range;

use crate::core::errors::Result;
use heuristic::SeparatorHeuristic;

/// Everything the history cache and renderer need to know about one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    pub ranges: Vec<Range<usize>>,
    pub values: Vec<i64>,
    pub fingerprint: u64,
}

impl ParsedLine {
    /// Tokenize, extract and fingerprint `line` in one pass over each stage.
    pub fn parse(line: &str, heuristic: SeparatorHeuristic) -> Result<Self> {
        let ranges = tokenizer::numeric_ranges(line, heuristic);
        let values = extract::values(line, &ranges)?;
        let fingerprint = fingerprint::fingerprint(line, &ranges);
        Ok(Self {
            ranges,
            values,
            fingerprint,
        })
    }
}
