//! Configuration system: TOML file + env var overrides + defaults.

#![allow(missing_docs)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::errors::{DwError, Result};
use crate::fields::heuristic::{DEFAULT_LEVEL, SeparatorHeuristic};
use crate::logger::trace::TraceValues;
use crate::render::display::{Layout, LayoutKind};
use crate::render::styles::Style;

/// Full dwatch configuration model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Config {
    pub watch: WatchConfig,
    pub trace: TraceConfig,
    pub process: ProcessConfig,
    pub paths: PathsConfig,
}

/// Cadence and presentation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WatchConfig {
    pub interval_ms: u64,
    /// Stop after this many ticks; run until interrupted when `None`.
    pub count: Option<u64>,
    pub banner: bool,
    pub drop_zero: bool,
    pub diff_mode: bool,
    pub heuristic_level: usize,
    /// Initial style by name.
    pub style: Option<String>,
    pub color: bool,
    pub layout: LayoutKind,
    pub tab_width: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct TraceConfig {
    pub path: Option<PathBuf>,
    pub values: TraceValues,
}

/// How commands are launched and where dwatch itself runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProcessConfig {
    pub shell: PathBuf,
    /// Pin the process to this CPU core.
    pub cpu: Option<usize>,
    /// Detach from the terminal; requires a trace path.
    pub daemon: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathsConfig {
    pub config_file: PathBuf,
    pub activity_log: Option<PathBuf>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            count: None,
            banner: true,
            drop_zero: false,
            diff_mode: false,
            heuristic_level: DEFAULT_LEVEL,
            style: None,
            color: true,
            layout: LayoutKind::Full,
            tab_width: 40,
        }
    }
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            shell: PathBuf::from("/bin/sh"),
            cpu: None,
            daemon: false,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        let home_dir = env::var_os("HOME").map_or_else(
            || {
                eprintln!("[DW-CONFIG] WARNING: HOME not set, falling back to /tmp");
                PathBuf::from("/tmp")
            },
            PathBuf::from,
        );
        Self {
            config_file: home_dir.join(".config").join("dwatch").join("config.toml"),
            activity_log: None,
        }
    }
}

impl Config {
    /// Default configuration path.
    #[must_use]
    pub fn default_path() -> PathBuf {
        PathsConfig::default().config_file
    }

    /// Load config from default or explicit path, then apply env overrides.
    ///
    /// A missing file at the default path is not an error; defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path_buf = path.map_or_else(Self::default_path, Path::to_path_buf);
        let is_explicit_path = path.is_some();

        let mut cfg = if path_buf.exists() {
            let raw = fs::read_to_string(&path_buf).map_err(|source| DwError::Io {
                path: path_buf.clone(),
                source,
            })?;
            let parsed: Self = toml::from_str(&raw)?;
            parsed
        } else if is_explicit_path {
            return Err(DwError::MissingConfig { path: path_buf });
        } else {
            Self::default()
        };

        cfg.paths.config_file = path_buf;
        cfg.apply_env_overrides_from(env_var)?;
        Ok(cfg)
    }

    /// Deterministic hash of the effective config for the activity log.
    ///
    /// FNV-1a over canonical JSON, stable across processes and releases.
    pub fn stable_hash(&self) -> Result<String> {
        let canonical = serde_json::to_string(self)?;
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in canonical.as_bytes() {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        Ok(format!("{hash:016x}"))
    }

    /// Apply `DWATCH_*` overrides read through `lookup`.
    pub fn apply_env_overrides_from<F>(&mut self, mut lookup: F) -> Result<()>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let w = &mut self.watch;
        if let Some(raw) = lookup("DWATCH_INTERVAL_MS") {
            w.interval_ms = parse_env("DWATCH_INTERVAL_MS", &raw)?;
        }
        if let Some(raw) = lookup("DWATCH_COUNT") {
            w.count = Some(parse_env("DWATCH_COUNT", &raw)?);
        }
        if let Some(raw) = lookup("DWATCH_BANNER") {
            w.banner = parse_env("DWATCH_BANNER", &raw)?;
        }
        if let Some(raw) = lookup("DWATCH_DROP_ZERO") {
            w.drop_zero = parse_env("DWATCH_DROP_ZERO", &raw)?;
        }
        if let Some(raw) = lookup("DWATCH_DIFF_MODE") {
            w.diff_mode = parse_env("DWATCH_DIFF_MODE", &raw)?;
        }
        if let Some(raw) = lookup("DWATCH_HEURISTIC_LEVEL") {
            w.heuristic_level = parse_env("DWATCH_HEURISTIC_LEVEL", &raw)?;
        }
        if let Some(raw) = lookup("DWATCH_COLOR") {
            w.color = parse_env("DWATCH_COLOR", &raw)?;
        }

        if let Some(raw) = lookup("DWATCH_TRACE_PATH") {
            self.trace.path = Some(PathBuf::from(raw));
        }
        if let Some(raw) = lookup("DWATCH_SHELL") {
            self.process.shell = PathBuf::from(raw);
        }
        if let Some(raw) = lookup("DWATCH_CPU") {
            self.process.cpu = Some(parse_env("DWATCH_CPU", &raw)?);
        }
        Ok(())
    }

    /// Check cross-field constraints. Run after CLI flags are merged.
    pub fn validate(&self) -> Result<()> {
        let w = &self.watch;
        if w.interval_ms == 0 {
            return Err(DwError::InvalidConfig {
                details: "watch.interval_ms must be > 0".to_string(),
            });
        }
        if w.count == Some(0) {
            return Err(DwError::InvalidConfig {
                details: "watch.count must be > 0 when set".to_string(),
            });
        }
        if !SeparatorHeuristic::is_known_level(w.heuristic_level) {
            return Err(DwError::InvalidConfig {
                details: format!(
                    "unknown heuristic level {} (expected 0..{})",
                    w.heuristic_level,
                    SeparatorHeuristic::LEVELS
                ),
            });
        }
        if let Some(name) = &w.style
            && Style::from_name(name).is_none()
        {
            return Err(DwError::InvalidConfig {
                details: format!("unknown style {name:?} (see --list-styles)"),
            });
        }
        if w.layout == LayoutKind::Tab && w.tab_width == 0 {
            return Err(DwError::InvalidConfig {
                details: "watch.tab_width must be > 0".to_string(),
            });
        }
        if self.process.daemon && self.trace.path.is_none() {
            return Err(DwError::InvalidConfig {
                details: "daemon mode requires a trace file".to_string(),
            });
        }
        Ok(())
    }

    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_millis(self.watch.interval_ms)
    }

    #[must_use]
    pub const fn layout(&self) -> Layout {
        match self.watch.layout {
            LayoutKind::Full => Layout::Full,
            LayoutKind::Tab => Layout::Tab {
                width: self.watch.tab_width,
            },
        }
    }

    /// Style the run starts in (the first style when none is named).
    #[must_use]
    pub fn initial_style(&self) -> Style {
        self.watch
            .style
            .as_deref()
            .and_then(Style::from_name)
            .unwrap_or(Style::Counter)
    }

    /// Diff mode at startup; naming a diff-only style turns it on.
    #[must_use]
    pub fn initial_diff_mode(&self) -> bool {
        self.watch.diff_mode || self.initial_style().needs_diff_mode()
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|raw| !raw.trim().is_empty())
}

fn parse_env<T>(name: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|error| DwError::ConfigParse {
        context: "env",
        details: format!("{name}={raw:?}: {error}"),
    })
}
