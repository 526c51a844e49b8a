//! Range tokenizer: locates signed decimal integers inside an opaque line.
//!
//! A token is a maximal `[sign] digit+` run bounded by separators (or the
//! line edges). Runs that touch non-separator text, like `eth0` or `1.5x`,
//! are literal text and produce nothing.

use std::ops::Range;

use super::heuristic::SeparatorHeuristic;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Inside literal text; only a separator gets us out.
    None,
    /// At line start or just after a separator.
    Space,
    /// Consumed a `+`/`-` that may start a token.
    Sign,
    /// Inside a run of digits.
    Digit,
}

#[inline]
const fn is_sign(c: char) -> bool {
    matches!(c, '-' | '+')
}

/// Byte ranges of every numeric token of `line`, left to right.
///
/// Ranges never overlap and their starts strictly increase.
#[must_use]
pub fn numeric_ranges(line: &str, heuristic: SeparatorHeuristic) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut state = State::Space;
    let mut start = 0;

    for (offset, c) in line.char_indices() {
        state = match state {
            State::None => {
                if heuristic.is_separator(c) {
                    State::Space
                } else {
                    State::None
                }
            }
            State::Space => {
                if c.is_ascii_digit() {
                    start = offset;
                    State::Digit
                } else if is_sign(c) {
                    start = offset;
                    State::Sign
                } else if heuristic.is_separator(c) {
                    State::Space
                } else {
                    State::None
                }
            }
            State::Sign => {
                if c.is_ascii_digit() {
                    State::Digit
                } else if is_sign(c) {
                    start = offset;
                    State::Sign
                } else if heuristic.is_separator(c) {
                    State::Space
                } else {
                    State::None
                }
            }
            State::Digit => {
                if heuristic.is_separator(c) {
                    ranges.push(start..offset);
                    State::Space
                } else if c.is_ascii_digit() {
                    State::Digit
                } else {
                    State::None
                }
            }
        };
    }

    if state == State::Digit {
        ranges.push(start..line.len());
    }

    ranges
}
