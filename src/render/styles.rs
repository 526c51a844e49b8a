//! Style registry: the seven annotation policies and their running state.

#![allow(missing_docs)]
#![allow(clippy::cast_precision_loss)]

use std::fmt;
use std::time::Duration;

use colored::{Color, Colorize};

/// Presentation policy for one numeric field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Style {
    /// Bracketed ordinal of the field within the tick.
    Counter,
    /// The value as read.
    Value,
    /// The value, followed by its delta when non-zero.
    ValueDelta,
    /// The delta alone; highlighted only when non-zero.
    Delta,
    /// Delta per second with K/M/G suffixes.
    Rate,
    /// The value, followed by its per-second rate when positive.
    ValueRate,
    /// Per-second rate plus the same rate ×8 in bits per second.
    Bitrate,
}

impl Style {
    /// Every style in selection order.
    pub const ALL: [Self; 7] = [
        Self::Counter,
        Self::Value,
        Self::ValueDelta,
        Self::Delta,
        Self::Rate,
        Self::ValueRate,
        Self::Bitrate,
    ];

    /// Styles reachable while diff mode is off.
    pub const PLAIN_COUNT: usize = 2;

    /// Number of styles selectable under the given diff mode.
    #[must_use]
    pub const fn selectable(diff_mode: bool) -> usize {
        if diff_mode {
            Self::ALL.len()
        } else {
            Self::PLAIN_COUNT
        }
    }

    /// Resolve an unbounded style counter against the selectable set.
    #[must_use]
    pub const fn resolve(index: usize, diff_mode: bool) -> Self {
        Self::ALL[index % Self::selectable(diff_mode)]
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Counter => "counter",
            Self::Value => "value",
            Self::ValueDelta => "value+delta",
            Self::Delta => "delta",
            Self::Rate => "rate",
            Self::ValueRate => "value+rate",
            Self::Bitrate => "bitrate",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Counter => "field ordinal within the tick, e.g. [3]",
            Self::Value => "raw value",
            Self::ValueDelta => "raw value and change since the last tick",
            Self::Delta => "change since the last tick",
            Self::Rate => "change per second with K/M/G suffixes",
            Self::ValueRate => "raw value and positive change per second",
            Self::Bitrate => "change per second and the same in bits per second",
        }
    }

    /// Position in [`Style::ALL`].
    #[must_use]
    pub fn index(self) -> usize {
        Self::ALL.iter().position(|s| *s == self).unwrap_or(0)
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }

    /// Whether the style is only reachable with diff mode on.
    #[must_use]
    pub fn needs_diff_mode(self) -> bool {
        self.index() >= Self::PLAIN_COUNT
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Input of one style pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    /// Annotate one field.
    Field { value: i64, delta: i64 },
    /// End of tick: clear running state.
    Reset,
}

/// Running state shared by the styles plus the rendering knobs they need.
#[derive(Debug, Clone)]
pub struct StyleRegistry {
    interval: Duration,
    color: bool,
    ordinal: u64,
}

impl StyleRegistry {
    #[must_use]
    pub fn new(interval: Duration, color: bool) -> Self {
        Self {
            interval,
            color,
            ordinal: 0,
        }
    }

    /// Run one pass of `style`. Returns the annotation text (empty on reset).
    pub fn apply(&mut self, style: Style, pass: Pass) -> String {
        match (style, pass) {
            (Style::Counter, Pass::Reset) => {
                self.ordinal = 0;
                String::new()
            }
            (_, Pass::Reset) => String::new(),
            (Style::Counter, Pass::Field { .. }) => {
                self.ordinal += 1;
                self.paint(&format!("[{}]", self.ordinal), Color::Yellow)
            }
            (Style::Value, Pass::Field { value, .. }) => {
                self.paint(&value.to_string(), Color::Blue)
            }
            (Style::ValueDelta, Pass::Field { value, delta }) => {
                let mut out = self.paint(&value.to_string(), Color::Red);
                if delta != 0 {
                    out.push_str(&self.paint(&format!("[{delta:+}]"), Color::Red));
                }
                out
            }
            (Style::Delta, Pass::Field { delta, .. }) => {
                if delta == 0 {
                    "0".to_string()
                } else {
                    self.paint(&format!("{delta:+}"), Color::Red)
                }
            }
            (Style::Rate, Pass::Field { delta, .. }) => {
                let rate = self.rate(delta);
                self.paint(&format!("{}/s", format_number(rate, false)), Color::Magenta)
            }
            (Style::ValueRate, Pass::Field { value, delta }) => {
                let mut out = self.paint(&value.to_string(), Color::Magenta);
                let rate = self.rate(delta);
                if rate > 0.0 {
                    out.push_str(&self.paint(
                        &format!("[{}/s]", format_number(rate, false)),
                        Color::Magenta,
                    ));
                }
                out
            }
            (Style::Bitrate, Pass::Field { delta, .. }) => {
                let rate = self.rate(delta);
                self.paint(
                    &format!(
                        "{}/s|{}",
                        format_number(rate, false),
                        format_number(rate * 8.0, true)
                    ),
                    Color::Green,
                )
            }
        }
    }

    /// Annotate one field.
    pub fn annotate(&mut self, style: Style, value: i64, delta: i64) -> String {
        self.apply(style, Pass::Field { value, delta })
    }

    /// End-of-tick reset pass for `style`.
    pub fn reset(&mut self, style: Style) {
        self.apply(style, Pass::Reset);
    }

    fn rate(&self, delta: i64) -> f64 {
        let secs = self.interval.as_secs_f64();
        if secs <= f64::EPSILON {
            return 0.0;
        }
        delta as f64 / secs
    }

    fn paint(&self, text: &str, color: Color) -> String {
        if self.color {
            text.color(color).bold().to_string()
        } else {
            text.to_string()
        }
    }
}

/// Format `value` with a K/M/G suffix (or Kbps/Mbps/Gbps when `bits`).
#[must_use]
pub fn format_number(value: f64, bits: bool) -> String {
    const GIGA: f64 = 1_000_000_000.0;
    const MEGA: f64 = 1_000_000.0;
    const KILO: f64 = 1_000.0;

    let (scaled, suffix) = match value.abs() {
        m if m >= GIGA => (value / GIGA, "G"),
        m if m >= MEGA => (value / MEGA, "M"),
        m if m >= KILO => (value / KILO, "K"),
        _ => (value, ""),
    };
    if bits {
        format!("{scaled:.2}{suffix}bps")
    } else {
        format!("{scaled:.2}{suffix}")
    }
}
