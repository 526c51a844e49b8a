//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use dwatch::prelude::*;
//! ```

// Core
pub use crate::core::config::Config;
pub use crate::core::errors::{DwError, Result};

// Fields
pub use crate::fields::ParsedLine;
pub use crate::fields::heuristic::SeparatorHeuristic;
pub use crate::fields::tokenizer::numeric_ranges;

// History
pub use crate::monitor::history::{Frame, HistoryCache, Observation, Shape};

// Render
pub use crate::render::display::{Display, Layout};
pub use crate::render::renderer::render_line;
pub use crate::render::styles::{Style, StyleRegistry, format_number};

// Scheduling
pub use crate::daemon::loop_main::{StopReason, TickScheduler};
pub use crate::daemon::runner::{ExitClass, ProcessRunner, ShellRunner};
pub use crate::daemon::signals::{SignalEvent, StyleSnapshot, StyleState};
