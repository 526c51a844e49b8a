//! Structural hash: a fingerprint of a line's non-numeric skeleton.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::ops::Range;

use super::ranges::contains;

/// The line with every token byte and every decimal digit removed, minus its
/// last character.
///
/// Digits outside tokens (`eth0`, a rejected `-1x`) are dropped too, so a
/// counter glued to text does not change the shape when it ticks.
#[must_use]
pub fn skeleton(line: &str, ranges: &[Range<usize>]) -> String {
    let mut projected: String = line
        .char_indices()
        .filter(|&(offset, c)| !c.is_ascii_digit() && !contains(ranges, offset))
        .map(|(_, c)| c)
        .collect();
    projected.pop();
    projected
}

/// Fingerprint of [`skeleton`], stable within one process.
#[must_use]
pub fn fingerprint(line: &str, ranges: &[Range<usize>]) -> u64 {
    let mut hasher = DefaultHasher::new();
    skeleton(line, ranges).hash(&mut hasher);
    hasher.finish()
}
