//! Separator heuristic: decides which characters bound a numeric token.

/// Punctuation treated as a separator at each level, on top of whitespace.
const LEVELS: [&str; 2] = [",:;()", ".,:;(){}[]='\"<>|`"];

/// Level used when nothing else is configured.
pub const DEFAULT_LEVEL: usize = 1;

/// A separator predicate selected by level.
///
/// Level 0 is the minimal set (`,:;()`), level 1 the extended set that also
/// splits on dots, brackets, quotes, `=`, `<`, `>` and `|`. Levels beyond the
/// last wrap around, so a signal-driven counter can be fed in directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeparatorHeuristic {
    level: usize,
}

impl SeparatorHeuristic {
    /// Number of available levels.
    pub const LEVELS: usize = LEVELS.len();

    /// Heuristic for `level`, reduced modulo the number of levels.
    #[must_use]
    pub const fn from_level(level: usize) -> Self {
        Self {
            level: level % Self::LEVELS,
        }
    }

    /// Whether `level` names an existing level without wrapping.
    #[must_use]
    pub const fn is_known_level(level: usize) -> bool {
        level < Self::LEVELS
    }

    #[must_use]
    pub const fn level(self) -> usize {
        self.level
    }

    /// The next level in the cycle.
    #[must_use]
    pub const fn next(self) -> Self {
        Self::from_level(self.level + 1)
    }

    #[inline]
    #[must_use]
    pub fn is_separator(self, c: char) -> bool {
        c.is_whitespace() || LEVELS[self.level].contains(c)
    }
}

impl Default for SeparatorHeuristic {
    fn default() -> Self {
        Self::from_level(DEFAULT_LEVEL)
    }
}
