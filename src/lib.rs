#![forbid(unsafe_code)]

//! dwatch — a `watch` that understands numbers.
//!
//! Runs shell commands at a fixed cadence, finds the numeric fields in every
//! output line, diffs them against the same line on the previous tick and
//! renders each field under a switchable style:
//! 1. **Fields** — separator heuristic, tokenizer, range algebra, fingerprint
//! 2. **History** — per-line frames and elementwise deltas across ticks
//! 3. **Render** — style registry, line renderer, cursor-positioned display
//!
//! # Library usage
//!
//! ```rust,no_run
//! use dwatch::prelude::*;
//!
//! let parsed = ParsedLine::parse("rx 10 tx 200", SeparatorHeuristic::default())?;
//! assert_eq!(parsed.values, vec![10, 200]);
//! # Ok::<(), DwError>(())
//! ```

pub mod prelude;

pub mod core;
pub mod daemon;
pub mod fields;
pub mod logger;
pub mod monitor;
pub mod platform;
pub mod render;
