//! Field extractor: integer values for token ranges, literal text for the rest.

use std::ops::Range;

use super::ranges::complement;
use crate::core::errors::{DwError, Result};

/// Parse every token range of `line` as a signed 64-bit integer.
///
/// The tokenizer only emits `[sign] digit+` runs, so a failure here means
/// either an out-of-range magnitude or a broken invariant; both surface as
/// [`DwError::FieldParse`].
pub fn values(line: &str, ranges: &[Range<usize>]) -> Result<Vec<i64>> {
    ranges
        .iter()
        .map(|range| {
            line.get(range.clone())
                .and_then(|token| token.parse::<i64>().ok())
                .ok_or_else(|| DwError::FieldParse {
                    line: line.to_string(),
                    range: range.clone(),
                })
        })
        .collect()
}

/// Literal substrings between the token ranges, in order.
#[must_use]
pub fn literals<'a>(line: &'a str, ranges: &[Range<usize>]) -> Vec<&'a str> {
    complement(ranges, line.len())
        .into_iter()
        .map(|gap| &line[gap])
        .collect()
}
