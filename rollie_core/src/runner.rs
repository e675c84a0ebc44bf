//! Station loop: polls the weight source and tag link, feeds the observer,
//! and renders the result.
//!
//! The station keeps the most recent tag record so the display can show the
//! subject's net weight between tag reads; a dismount handler clears it.
//! Successful weighings are written back through the tag link.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use eyre::WrapErr;
use rollie_traits::clock::Clock;
use rollie_traits::{Display, Indicators, TagLink, TagPoll, TagRecord, WeightSource};

use crate::config::StationCfg;
use crate::error::{ObserverError, Result, RollieError};
use crate::hw_error::map_boxed;
use crate::observer::{ScaleObserver, Transitions, WeighingEvent};
use crate::registry::Lifetime;
use crate::util::{format_weight, period_us};

const FLUSH_TAG_HANDLER: &str = "station.flush-tag";
const RECORD_HANDLER: &str = "station.record-weighing";

/// Weighings kept in `RunSummary::recent_weighings`; older ones are only counted.
pub const RECENT_WEIGHINGS: usize = 32;

/// Digital inputs handled by the station, outside the observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Re-zero the weight source.
    Tare,
    /// Write the current net weight to the memoized tag.
    Register,
}

/// A successful weighing as the station recorded it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeighingRecord {
    pub total_weight_g: f32,
    pub reference_weight_g: f32,
    pub net_weight_g: f32,
}

/// Result of a single polling cycle.
#[derive(Debug, Clone)]
pub enum CycleOutcome {
    Updated(Transitions),
    /// The weight source failed; the observer was not touched.
    Skipped(RollieError),
    /// The observer rejected the sample.
    Rejected(ObserverError),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub cycles: u64,
    pub skipped: u64,
    pub rejected: u64,
    pub mounts: u64,
    pub dismounts: u64,
    /// Successful weighings over the whole run.
    pub weighings: u64,
    /// The last `RECENT_WEIGHINGS` weighings, oldest first.
    pub recent_weighings: VecDeque<WeighingRecord>,
}

impl RunSummary {
    fn record_weighing(&mut self, record: WeighingRecord) {
        self.weighings += 1;
        if self.recent_weighings.len() == RECENT_WEIGHINGS {
            self.recent_weighings.pop_front();
        }
        self.recent_weighings.push_back(record);
    }
}

pub struct Station<W, T, D> {
    pub(crate) scale: W,
    pub(crate) tags: T,
    pub(crate) display: D,
    pub(crate) observer: ScaleObserver,
    pub(crate) cfg: StationCfg,
    pub(crate) clock: Box<dyn Clock + Send + Sync>,
    memo: Rc<RefCell<Option<TagRecord>>>,
    completed: Rc<RefCell<Vec<WeighingEvent>>>,
    summary: RunSummary,
    consecutive_failures: u32,
    buttons: Option<ButtonSource>,
}

/// Polled once per cycle by `run`; returns the buttons pressed since the last call.
pub type ButtonSource = Box<dyn FnMut() -> Vec<Button>>;

impl<W, T, D> std::fmt::Debug for Station<W, T, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Station")
            .field("cfg", &self.cfg)
            .field("observer", &self.observer)
            .field("memo", &self.memo.borrow())
            .field("summary", &self.summary)
            .finish()
    }
}

impl<W: WeightSource, T: TagLink, D: Display> Station<W, T, D> {
    pub(crate) fn assemble(
        scale: W,
        tags: T,
        display: D,
        mut observer: ScaleObserver,
        cfg: StationCfg,
        clock: Box<dyn Clock + Send + Sync>,
    ) -> Self {
        let memo = Rc::new(RefCell::new(None::<TagRecord>));
        let completed = Rc::new(RefCell::new(Vec::new()));

        let flush = memo.clone();
        observer.on_dismount(FLUSH_TAG_HANDLER, Lifetime::Unlimited, move |_| {
            if flush.borrow_mut().take().is_some() {
                tracing::debug!("dismount: flushed memoized tag");
            }
        });
        let sink = completed.clone();
        observer.on_successful_weighing(RECORD_HANDLER, Lifetime::Unlimited, move |ev, _| {
            sink.borrow_mut().push(*ev);
        });

        Self {
            scale,
            tags,
            display,
            observer,
            cfg,
            clock,
            memo,
            completed,
            summary: RunSummary::default(),
            consecutive_failures: 0,
            buttons: None,
        }
    }

    pub fn observer(&self) -> &ScaleObserver {
        &self.observer
    }

    /// Access to the observer for registering extra handlers.
    pub fn observer_mut(&mut self) -> &mut ScaleObserver {
        &mut self.observer
    }

    /// Attach a button source polled by `run` before every cycle.
    pub fn set_button_source(&mut self, source: ButtonSource) {
        self.buttons = Some(source);
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    /// Tag record currently used for net-weight display.
    pub fn memoized_tag(&self) -> Option<TagRecord> {
        self.memo.borrow().clone()
    }

    /// Total weight minus the memoized tag's reference weight, if any.
    pub fn net_weight(&self, total_weight_g: f32) -> f32 {
        let reference = self
            .memo
            .borrow()
            .as_ref()
            .map_or(0.0, |t| t.reference_weight_g);
        total_weight_g - reference
    }

    /// One polling cycle: read, poll, update, record, render.
    pub fn cycle(&mut self) -> CycleOutcome {
        self.summary.cycles += 1;

        let weight = match self.scale.read_mean(self.cfg.readings_per_sample) {
            Ok(w) => w,
            Err(e) => {
                let err = map_boxed(&e);
                tracing::warn!(error = %err, "weight read failed; skipping cycle");
                self.summary.skipped += 1;
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
                return CycleOutcome::Skipped(err);
            }
        };
        self.consecutive_failures = 0;

        let poll = self.tags.poll().unwrap_or_else(|e| {
            tracing::warn!(error = %map_boxed(&e), "tag poll failed");
            TagPoll::absent()
        });

        let transitions = match self.observer.update(weight, poll.record, poll.present) {
            Ok(t) => t,
            Err(e) => {
                self.summary.rejected += 1;
                return CycleOutcome::Rejected(e);
            }
        };

        if let Some(record) = &self.observer.state().tag {
            *self.memo.borrow_mut() = Some(record.clone());
        }
        if transitions.mounted {
            self.summary.mounts += 1;
        }
        if transitions.dismounted {
            self.summary.dismounts += 1;
        }

        self.drain_weighings();
        self.render();
        CycleOutcome::Updated(transitions)
    }

    fn drain_weighings(&mut self) {
        let events: Vec<WeighingEvent> = self.completed.borrow_mut().drain(..).collect();
        for ev in events {
            let record = WeighingRecord {
                total_weight_g: ev.total_weight_g,
                reference_weight_g: ev.reference_weight_g,
                net_weight_g: ev.net_weight_g(),
            };
            if let Err(e) = self.tags.write_weight(record.net_weight_g) {
                tracing::warn!(error = %map_boxed(&e), "could not write weight to tag");
            }
            self.summary.record_weighing(record);
        }
    }

    fn render(&mut self) {
        let state = self.observer.state();
        let text = format_weight(self.net_weight(state.total_weight_g));
        let indicators = Indicators {
            on_scale: state.person_on_scale,
            stable: state.is_stable,
            tagged: self.memo.borrow().is_some(),
        };
        if let Err(e) = self.display.show(&text, indicators) {
            tracing::warn!(error = %map_boxed(&e), "display update failed");
        }
    }

    pub fn handle_button(&mut self, button: Button) -> Result<()> {
        match button {
            Button::Tare => {
                self.scale
                    .tare(self.cfg.tare_readings)
                    .map_err(|e| eyre::Report::new(map_boxed(&e)))
                    .wrap_err("tare")?;
                tracing::info!(readings = self.cfg.tare_readings, "tared");
            }
            Button::Register => {
                if self.memo.borrow().is_none() {
                    tracing::warn!("register pressed without a tag; ignoring");
                    return Ok(());
                }
                let net = self.net_weight(self.observer.state().total_weight_g);
                self.tags
                    .write_weight(net)
                    .map_err(|e| eyre::Report::new(map_boxed(&e)))
                    .wrap_err("register weight")?;
                tracing::info!(net_g = net, "weight registered to tag");
            }
        }
        Ok(())
    }

    fn poll_buttons(&mut self) {
        let pressed = match self.buttons.as_mut() {
            Some(source) => source(),
            None => return,
        };
        for button in pressed {
            if let Err(e) = self.handle_button(button) {
                tracing::warn!(?button, error = %e, "button action failed");
            }
        }
    }

    /// Run cycles at the configured rate until `max_cycles` is reached or
    /// `shutdown` is set.
    ///
    /// Each cycle starts one period after the previous one; time spent in
    /// the cycle itself is taken out of the sleep.
    ///
    /// Fails with `RollieError::Timeout` once the weight source has failed
    /// `max_consecutive_failures` cycles in a row (0 disables the check).
    pub fn run(&mut self, max_cycles: Option<u64>, shutdown: &AtomicBool) -> Result<RunSummary> {
        let period = Duration::from_micros(period_us(self.cfg.sample_rate_hz));
        tracing::info!(
            sample_rate_hz = self.cfg.sample_rate_hz,
            readings = self.cfg.readings_per_sample,
            "station start"
        );
        let epoch = self.clock.now();
        let mut done: u64 = 0;
        loop {
            if shutdown.load(Ordering::Relaxed) {
                tracing::info!(cycles = done, "shutdown requested");
                break;
            }
            if let Some(max) = max_cycles
                && done >= max
            {
                break;
            }
            let started = self.clock.now();
            self.poll_buttons();
            self.cycle();
            done += 1;
            let limit = self.cfg.max_consecutive_failures;
            if limit > 0 && self.consecutive_failures >= limit {
                tracing::error!(failures = self.consecutive_failures, "weight source stalled");
                return Err(eyre::Report::new(RollieError::Timeout))
                    .wrap_err("weight source stalled");
            }
            let spent = self.clock.now().saturating_duration_since(started);
            if spent > period {
                tracing::debug!(spent_us = spent.as_micros() as u64, "cycle overran its period");
            }
            self.clock.sleep(period.saturating_sub(spent));
        }
        tracing::info!(
            cycles = self.summary.cycles,
            weighings = self.summary.weighings,
            elapsed_ms = self.clock.ms_since(epoch),
            "station stop"
        );
        Ok(self.summary.clone())
    }
}
