//! Range algebra over sorted, non-overlapping half-open byte ranges.

use std::ops::Range;

/// Gaps between `ranges` within `[0, len)`, with empty gaps dropped.
///
/// Includes the gap before the first range and the one after the last.
/// Two adjacent ranges therefore contribute no gap between them.
#[must_use]
pub fn complement(ranges: &[Range<usize>], len: usize) -> Vec<Range<usize>> {
    let mut gaps = Vec::with_capacity(ranges.len() + 1);
    let mut cursor = 0;

    for range in ranges {
        gaps.push(cursor..range.start);
        cursor = range.end;
    }
    gaps.push(cursor..len);

    gaps.retain(|gap| gap.start < gap.end);
    gaps
}

/// Whether `offset` falls inside any of the sorted `ranges`.
///
/// Stops at the first range starting past `offset`.
#[must_use]
pub fn contains(ranges: &[Range<usize>], offset: usize) -> bool {
    for range in ranges {
        if offset < range.start {
            return false;
        }
        if offset < range.end {
            return true;
        }
    }
    false
}

/// One piece of a line in positional order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
    /// Literal text to reproduce verbatim.
    Literal(Range<usize>),
    /// The numeric field with this index among the line's tokens.
    Field(usize, Range<usize>),
}

/// Interleave literal gaps and numeric fields of a line, left to right.
///
/// Handles a field at offset 0 (emitted before any literal) and lines with
/// no fields at all (a single literal, or nothing for an empty line).
#[must_use]
pub fn spans(ranges: &[Range<usize>], len: usize) -> Vec<Span> {
    let literals = complement(ranges, len);
    let mut out = Vec::with_capacity(literals.len() + ranges.len());
    let mut literals = literals.into_iter().peekable();
    let mut fields = ranges.iter().cloned().enumerate().peekable();

    loop {
        let take_literal = match (literals.peek(), fields.peek()) {
            (Some(lit), Some((_, field))) => lit.start < field.start,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => break,
        };
        if take_literal {
            if let Some(lit) = literals.next() {
                out.push(Span::Literal(lit));
            }
        } else if let Some((index, field)) = fields.next() {
            out.push(Span::Field(index, field));
        }
    }

    out
}
