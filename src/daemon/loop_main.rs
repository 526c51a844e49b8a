//! Tick scheduler: runs every command once per interval, pushes each output
//! line through tokenizer → history cache → renderer and paints the frame.

#![allow(missing_docs)]

use std::fs::File;
use std::io::{BufWriter, Write};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, select};

use crate::core::config::Config;
use crate::core::errors::{DwError, Result};
use crate::daemon::runner::{ExitClass, ProcessRunner};
use crate::daemon::signals::{SignalEvent, StyleState};
use crate::fields::ParsedLine;
use crate::logger::jsonl::{ActivityEvent, ActivityLog};
use crate::logger::trace::TraceWriter;
use crate::monitor::history::{Frame, HistoryCache, LineId};
use crate::render::display::{self, Display};
use crate::render::renderer::render_line;
use crate::render::styles::StyleRegistry;

/// Why [`TickScheduler::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The configured tick count was reached.
    Count,
    /// SIGINT/SIGTERM (or an explicit shutdown request).
    Shutdown,
}

impl StopReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::Shutdown => "shutdown",
        }
    }
}

// ──────────────────── scheduler ────────────────────

pub struct TickScheduler<R: ProcessRunner, W: Write> {
    commands: Vec<String>,
    interval: Duration,
    count: Option<u64>,
    banner: bool,
    drop_zero: bool,
    trace_label: Option<String>,
    config_hash: String,
    runner: R,
    display: Display<W>,
    cache: HistoryCache,
    registry: StyleRegistry,
    state: Arc<StyleState>,
    trace: Option<TraceWriter<BufWriter<File>>>,
    activity: ActivityLog,
    ticks: u64,
}

impl<R: ProcessRunner, W: Write> TickScheduler<R, W> {
    /// Build a scheduler from a validated config. Opens the trace file.
    pub fn new(
        config: &Config,
        commands: Vec<String>,
        runner: R,
        out: W,
        state: Arc<StyleState>,
        activity: ActivityLog,
    ) -> Result<Self> {
        if commands.is_empty() {
            return Err(DwError::InvalidConfig {
                details: "no command to watch".to_string(),
            });
        }
        let interval = config.interval();
        let config_hash = config.stable_hash()?;
        let trace = config
            .trace
            .path
            .as_deref()
            .map(|path| TraceWriter::create(path, config.trace.values, interval))
            .transpose()?;

        Ok(Self {
            commands,
            interval,
            count: config.watch.count,
            banner: config.watch.banner,
            drop_zero: config.watch.drop_zero,
            trace_label: config.trace.path.as_ref().map(|p| p.display().to_string()),
            config_hash,
            runner,
            display: Display::new(out, config.layout()),
            cache: HistoryCache::new(),
            registry: StyleRegistry::new(interval, config.watch.color),
            state,
            trace,
            activity,
            ticks: 0,
        })
    }

    /// Number of completed ticks.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// The display sink's underlying writer.
    #[must_use]
    pub fn output(&self) -> &W {
        self.display.get_ref()
    }

    #[must_use]
    pub const fn cache(&self) -> &HistoryCache {
        &self.cache
    }

    /// Run one tick: every command once, one painted frame.
    pub fn tick(&mut self) -> Result<()> {
        let snapshot = self.state.snapshot();
        if self.state.take_repaint() {
            self.display.request_repaint();
        }
        let banner = self.banner.then(|| {
            display::banner(
                self.interval,
                &self.commands,
                &snapshot,
                self.trace_label.as_deref(),
            )
        });

        let Self {
            commands,
            drop_zero,
            runner,
            display,
            cache,
            registry,
            trace,
            activity,
            ticks,
            ..
        } = self;
        let style = snapshot.style();
        let tick = *ticks;

        display.begin_frame(banner.as_deref()).map_err(display_error)?;
        if let Some(trace) = trace.as_mut() {
            trace.begin_row(tick);
        }

        let mut next_id: LineId = 0;
        for (index, command) in commands.iter().enumerate() {
            display.begin_command(index);
            let class = runner.run(command, &mut |line| {
                let parsed = ParsedLine::parse(line, snapshot.heuristic)?;
                let observation = cache.update(next_id, Frame::from(&parsed));
                next_id += 1;

                if let Some(trace) = trace.as_mut() {
                    let delta = (!observation.shape.is_passthrough())
                        .then_some(observation.delta.as_slice());
                    trace.push_line(&parsed.values, delta);
                }

                let all_zero = !parsed.values.is_empty() && parsed.values.iter().all(|v| *v == 0);
                if *drop_zero && all_zero {
                    return Ok(());
                }
                let rendered = render_line(line, &parsed, &observation, style, registry);
                display.write_line(&rendered).map_err(display_error)
            })?;

            match class {
                ExitClass::Success => {}
                ExitClass::Failed(code) => {
                    activity.record(&ActivityEvent::ChildExited {
                        command: command.clone(),
                        tick,
                        exit_code: Some(code),
                        details: format!("exit status {code}"),
                    });
                    display
                        .write_line(&format!("[exit status {code}]"))
                        .map_err(display_error)?;
                }
                ExitClass::Fatal(status) => {
                    activity.record(&ActivityEvent::ChildExited {
                        command: command.clone(),
                        tick,
                        exit_code: None,
                        details: status.clone(),
                    });
                    return Err(DwError::ChildFailed {
                        command: command.clone(),
                        status,
                    });
                }
            }
        }

        registry.reset(style);
        if let Some(trace) = trace.as_mut() {
            trace.end_row()?;
        }
        display.end_frame().map_err(display_error)?;
        *ticks += 1;
        Ok(())
    }

    /// Tick at fixed boundaries until the count is reached or shutdown is
    /// requested. `events` wakes the wait early; it may be disconnected.
    pub fn run(&mut self, events: &Receiver<SignalEvent>) -> Result<StopReason> {
        self.activity.record(&ActivityEvent::RunStarted {
            version: env!("CARGO_PKG_VERSION").to_string(),
            config_hash: self.config_hash.clone(),
            commands: self.commands.clone(),
        });

        let ticker = crossbeam_channel::tick(self.interval);
        let outcome = self.run_ticks(&ticker, events);

        let finished = self.display.finish().map_err(display_error);
        match &outcome {
            Ok(reason) => self.activity.record(&ActivityEvent::RunStopped {
                ticks: self.ticks,
                reason: reason.as_str().to_string(),
            }),
            Err(e) => self.activity.record(&ActivityEvent::Error {
                code: e.code().to_string(),
                message: e.to_string(),
            }),
        }
        let reason = outcome?;
        finished?;
        Ok(reason)
    }

    fn run_ticks(
        &mut self,
        ticker: &Receiver<Instant>,
        events: &Receiver<SignalEvent>,
    ) -> Result<StopReason> {
        loop {
            if self.state.should_shutdown() {
                return Ok(StopReason::Shutdown);
            }
            self.tick()?;
            if self.count.is_some_and(|limit| self.ticks >= limit) {
                return Ok(StopReason::Count);
            }
            wait_for_boundary(ticker, events);
        }
    }
}

/// Block until the next tick boundary or a shutdown event.
fn wait_for_boundary(ticker: &Receiver<Instant>, events: &Receiver<SignalEvent>) {
    loop {
        select! {
            recv(ticker) -> _ => return,
            recv(events) -> event => match event {
                Ok(SignalEvent::Shutdown) => return,
                Ok(_) => {}
                Err(_) => {
                    let _ = ticker.recv();
                    return;
                }
            },
        }
    }
}

fn display_error(source: std::io::Error) -> DwError {
    DwError::io("<display>", source)
}
