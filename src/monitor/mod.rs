//! Cross-tick state: per-line history and deltas.

pub mod history;
