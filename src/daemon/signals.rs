//! Signal handling: SIGQUIT cycles the style, SIGTSTP toggles diff mode,
//! SIGUSR1 cycles the separator heuristic, SIGWINCH requests a repaint and
//! SIGTERM/SIGINT stop the run at the next tick boundary.
//!
//! Uses the `signal-hook` crate for safe signal registration. A dedicated
//! thread drains the signal iterator and only touches atomics; the scheduler
//! takes one [`StyleSnapshot`] per tick rather than reading them ambiently.

#![allow(missing_docs)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::fields::heuristic::SeparatorHeuristic;
use crate::render::styles::Style;

// ──────────────────── shared style state ────────────────────

/// Asynchronously mutated presentation state.
///
/// All fields use `Ordering::Relaxed`: a change may land on the current
/// tick's remaining lines or only on the next tick, and either is fine.
#[derive(Debug)]
pub struct StyleState {
    style: AtomicUsize,
    diff_mode: AtomicBool,
    heuristic: AtomicUsize,
    repaint: AtomicBool,
    shutdown: Arc<AtomicBool>,
}

/// Values of [`StyleState`] as read at a tick boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleSnapshot {
    pub style_index: usize,
    pub diff_mode: bool,
    pub heuristic: SeparatorHeuristic,
}

impl StyleSnapshot {
    /// The style the index resolves to under this diff mode.
    #[must_use]
    pub const fn style(&self) -> Style {
        Style::resolve(self.style_index, self.diff_mode)
    }
}

impl StyleState {
    #[must_use]
    pub fn new(style_index: usize, diff_mode: bool, heuristic_level: usize) -> Self {
        Self {
            style: AtomicUsize::new(style_index),
            diff_mode: AtomicBool::new(diff_mode),
            heuristic: AtomicUsize::new(heuristic_level),
            repaint: AtomicBool::new(false),
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> StyleSnapshot {
        StyleSnapshot {
            style_index: self.style.load(Ordering::Relaxed),
            diff_mode: self.diff_mode.load(Ordering::Relaxed),
            heuristic: SeparatorHeuristic::from_level(self.heuristic.load(Ordering::Relaxed)),
        }
    }

    /// Advance the style counter. The counter is unbounded and wraps.
    pub fn cycle_style(&self) {
        self.style.fetch_add(1, Ordering::Relaxed);
    }

    /// Flip diff mode, returning the new value.
    pub fn toggle_diff_mode(&self) -> bool {
        !self.diff_mode.fetch_xor(true, Ordering::Relaxed)
    }

    /// Advance the heuristic level, returning the new (reduced) level.
    pub fn cycle_heuristic(&self) -> usize {
        let next = self.heuristic.fetch_add(1, Ordering::Relaxed) + 1;
        SeparatorHeuristic::from_level(next).level()
    }

    pub fn request_repaint(&self) {
        self.repaint.store(true, Ordering::Relaxed);
    }

    /// Check (and clear) whether a repaint has been requested.
    pub fn take_repaint(&self) -> bool {
        self.repaint.swap(false, Ordering::Relaxed)
    }

    pub fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    pub fn should_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }

    /// Flag handed to `signal-hook` so a second termination signal exits hard.
    #[must_use]
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }
}

impl Default for StyleState {
    fn default() -> Self {
        Self::new(0, false, crate::fields::heuristic::DEFAULT_LEVEL)
    }
}

/// Edge-triggered input derived from a delivered signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalEvent {
    CycleStyle,
    ToggleDiffMode,
    CycleHeuristic,
    Repaint,
    Shutdown,
}

impl SignalEvent {
    /// Apply the event to `state`.
    pub fn apply(self, state: &StyleState) {
        match self {
            Self::CycleStyle => state.cycle_style(),
            Self::ToggleDiffMode => {
                state.toggle_diff_mode();
            }
            Self::CycleHeuristic => {
                state.cycle_heuristic();
            }
            Self::Repaint => state.request_repaint(),
            Self::Shutdown => state.request_shutdown(),
        }
    }
}

// ──────────────────── signal handler ────────────────────

#[cfg(feature = "signals")]
pub use handler::SignalHandler;

#[cfg(feature = "signals")]
mod handler {
    use std::sync::Arc;
    use std::thread;

    use crossbeam_channel::Sender;
    use signal_hook::consts::{SIGINT, SIGQUIT, SIGTERM, SIGTSTP, SIGUSR1, SIGWINCH};
    use signal_hook::iterator::{Handle, Signals};

    use super::{SignalEvent, StyleState};
    use crate::core::errors::{DwError, Result};
    use crate::logger::jsonl::{ActivityEvent, ActivityLog};

    /// Owns the signal thread. Dropping it unregisters the iterator.
    pub struct SignalHandler {
        handle: Handle,
        join: Option<thread::JoinHandle<()>>,
    }

    impl SignalHandler {
        /// Register OS signal hooks and start the draining thread.
        ///
        /// Every applied event is forwarded on `events` so a sleeping
        /// scheduler can wake early on shutdown.
        pub fn spawn(
            state: Arc<StyleState>,
            events: Sender<SignalEvent>,
            activity: ActivityLog,
        ) -> Result<Self> {
            for sig in [SIGINT, SIGTERM] {
                // A second termination signal while the first is pending exits.
                if let Err(e) =
                    signal_hook::flag::register_conditional_shutdown(sig, 1, state.shutdown_flag())
                {
                    eprintln!("[DW-SIGNAL] failed to arm hard exit for {sig}: {e}");
                }
            }

            let mut signals = Signals::new([SIGQUIT, SIGTSTP, SIGUSR1, SIGWINCH, SIGINT, SIGTERM])
                .map_err(|e| DwError::Runtime {
                    details: format!("failed to register signal handlers: {e}"),
                })?;
            let handle = signals.handle();

            let join = thread::Builder::new()
                .name("dwatch-signals".to_string())
                .spawn(move || {
                    for sig in signals.forever() {
                        let Some(event) = event_for(sig) else {
                            continue;
                        };
                        event.apply(&state);
                        log_event(&activity, event, &state);
                        let _ = events.send(event);
                    }
                })
                .map_err(|e| DwError::Runtime {
                    details: format!("failed to spawn signal thread: {e}"),
                })?;

            Ok(Self {
                handle,
                join: Some(join),
            })
        }
    }

    impl Drop for SignalHandler {
        fn drop(&mut self) {
            self.handle.close();
            if let Some(join) = self.join.take() {
                let _ = join.join();
            }
        }
    }

    fn event_for(sig: i32) -> Option<SignalEvent> {
        match sig {
            SIGQUIT => Some(SignalEvent::CycleStyle),
            SIGTSTP => Some(SignalEvent::ToggleDiffMode),
            SIGUSR1 => Some(SignalEvent::CycleHeuristic),
            SIGWINCH => Some(SignalEvent::Repaint),
            SIGINT | SIGTERM => Some(SignalEvent::Shutdown),
            _ => None,
        }
    }

    fn log_event(activity: &ActivityLog, event: SignalEvent, state: &StyleState) {
        let snapshot = state.snapshot();
        let entry = match event {
            SignalEvent::CycleStyle => ActivityEvent::StyleChanged {
                style: snapshot.style().name().to_string(),
            },
            SignalEvent::ToggleDiffMode => ActivityEvent::DiffToggled {
                diff_mode: snapshot.diff_mode,
            },
            SignalEvent::CycleHeuristic => ActivityEvent::HeuristicChanged {
                level: snapshot.heuristic.level(),
            },
            SignalEvent::Repaint => ActivityEvent::Repaint,
            SignalEvent::Shutdown => return,
        };
        activity.record(&entry);
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn signal_numbers_map_to_events() {
            assert_eq!(event_for(SIGQUIT), Some(SignalEvent::CycleStyle));
            assert_eq!(event_for(SIGTSTP), Some(SignalEvent::ToggleDiffMode));
            assert_eq!(event_for(SIGUSR1), Some(SignalEvent::CycleHeuristic));
            assert_eq!(event_for(SIGWINCH), Some(SignalEvent::Repaint));
            assert_eq!(event_for(SIGTERM), Some(SignalEvent::Shutdown));
            assert_eq!(event_for(0), None);
        }
    }
}

// ──────────────────── tests ────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_initial_state() {
        let state = StyleState::new(1, false, 0);
        let snap = state.snapshot();
        assert_eq!(snap.style_index, 1);
        assert!(!snap.diff_mode);
        assert_eq!(snap.heuristic.level(), 0);
        assert_eq!(snap.style(), Style::Value);
    }

    #[test]
    fn cycling_style_wraps_within_selectable_set() {
        let state = StyleState::new(0, false, 1);
        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(state.snapshot().style());
            state.cycle_style();
        }
        assert_eq!(
            seen,
            vec![Style::Counter, Style::Value, Style::Counter, Style::Value]
        );
    }

    #[test]
    fn toggling_diff_mode_widens_styles() {
        let state = StyleState::new(4, false, 1);
        assert_eq!(state.snapshot().style(), Style::Counter);
        assert!(state.toggle_diff_mode());
        assert_eq!(state.snapshot().style(), Style::Rate);
        assert!(!state.toggle_diff_mode());
    }

    #[test]
    fn heuristic_cycles_through_levels() {
        let state = StyleState::new(0, false, 1);
        assert_eq!(state.cycle_heuristic(), 0);
        assert_eq!(state.cycle_heuristic(), 1);
        assert_eq!(state.snapshot().heuristic.level(), 1);
    }

    #[test]
    fn repaint_flag_clears_on_read() {
        let state = StyleState::default();
        assert!(!state.take_repaint());
        SignalEvent::Repaint.apply(&state);
        assert!(state.take_repaint());
        assert!(!state.take_repaint());
    }

    #[test]
    fn shutdown_is_sticky_and_shared() {
        let state = StyleState::default();
        let flag = state.shutdown_flag();
        assert!(!state.should_shutdown());
        SignalEvent::Shutdown.apply(&state);
        assert!(state.should_shutdown());
        assert!(flag.load(Ordering::Relaxed));
    }

    #[test]
    fn concurrent_cycles_converge() {
        let state = Arc::new(StyleState::new(0, true, 1));
        let workers: Vec<_> = (0..4)
            .map(|_| {
                let state = Arc::clone(&state);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        SignalEvent::CycleStyle.apply(&state);
                    }
                })
            })
            .collect();
        for w in workers {
            w.join().unwrap();
        }
        assert_eq!(state.snapshot().style_index, 400);
        assert_eq!(state.snapshot().style(), Style::ALL[400 % 7]);
    }
}
