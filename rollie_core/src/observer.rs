//! Scale observer: debounced presence, stability, and tag presence combined
//! into mount / dismount / successful-weighing events.
//!
//! `update` is the only way state changes. It runs to completion on the
//! caller's thread and invokes handlers inline, so handlers must not block.
//! Handlers cannot reach the observer directly; they get a [`Deferred`]
//! queue instead, and whatever they register there is applied once the
//! current `update` has finished dispatching.

use rollie_traits::TagRecord;

use crate::config::ObserverCfg;
use crate::error::{BuildError, ObserverError, Result};
use crate::registry::{EventRegistry, HandlerId, Lifetime};
use crate::stability::StabilityWindow;
use crate::threshold::ThresholdDebouncer;

/// The three event kinds the observer dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Mount,
    Dismount,
    SuccessfulWeighing,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Mount => "mount",
            EventKind::Dismount => "dismount",
            EventKind::SuccessfulWeighing => "successful_weighing",
        }
    }
}

/// Payload of a successful weighing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeighingEvent {
    pub total_weight_g: f32,
    /// Tag reference weight, `0.0` when no tag record was read.
    pub reference_weight_g: f32,
}

impl WeighingEvent {
    /// Weight of the subject alone.
    #[inline]
    pub fn net_weight_g(&self) -> f32 {
        self.total_weight_g - self.reference_weight_g
    }
}

/// Snapshot of the observer after the latest accepted `update`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObserverState {
    pub person_on_scale: bool,
    pub is_stable: bool,
    pub total_weight_g: f32,
    pub tag: Option<TagRecord>,
    pub nfc_present: bool,
}

/// What changed during one `update`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Transitions {
    pub mounted: bool,
    pub dismounted: bool,
    /// The window went from unstable to stable this cycle.
    pub stabilized: bool,
    /// A successful-weighing event was dispatched.
    pub weighed: bool,
    /// Handlers that panicked during this update.
    pub failed_handlers: usize,
}

type Simple = Box<dyn FnMut(&mut Deferred)>;
type Weighing = Box<dyn FnMut(&WeighingEvent, &mut Deferred)>;

enum Pending {
    Mount(HandlerId, Lifetime, Simple),
    Dismount(HandlerId, Lifetime, Simple),
    Weighing(HandlerId, Lifetime, Weighing),
    Remove(EventKind, HandlerId),
}

/// Registration queue handed to handlers during dispatch.
#[derive(Default)]
pub struct Deferred {
    pending: Vec<Pending>,
}

impl Deferred {
    pub fn on_mount<F>(&mut self, id: impl Into<HandlerId>, lifetime: Lifetime, f: F)
    where
        F: FnMut(&mut Deferred) + 'static,
    {
        self.pending
            .push(Pending::Mount(id.into(), lifetime, Box::new(f)));
    }

    pub fn on_dismount<F>(&mut self, id: impl Into<HandlerId>, lifetime: Lifetime, f: F)
    where
        F: FnMut(&mut Deferred) + 'static,
    {
        self.pending
            .push(Pending::Dismount(id.into(), lifetime, Box::new(f)));
    }

    pub fn on_successful_weighing<F>(&mut self, id: impl Into<HandlerId>, lifetime: Lifetime, f: F)
    where
        F: FnMut(&WeighingEvent, &mut Deferred) + 'static,
    {
        self.pending
            .push(Pending::Weighing(id.into(), lifetime, Box::new(f)));
    }

    pub fn remove(&mut self, kind: EventKind, id: impl Into<HandlerId>) {
        self.pending.push(Pending::Remove(kind, id.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl std::fmt::Debug for Deferred {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deferred")
            .field("pending", &self.pending.len())
            .finish()
    }
}

pub struct ScaleObserver {
    cfg: ObserverCfg,
    debouncer: ThresholdDebouncer,
    window: StabilityWindow,
    mount: EventRegistry<(), Deferred>,
    dismount: EventRegistry<(), Deferred>,
    weighing: EventRegistry<WeighingEvent, Deferred>,
    state: ObserverState,
}

impl std::fmt::Debug for ScaleObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScaleObserver")
            .field("cfg", &self.cfg)
            .field("state", &self.state)
            .field("mount", &self.mount)
            .field("dismount", &self.dismount)
            .field("weighing", &self.weighing)
            .finish()
    }
}

impl ScaleObserver {
    pub fn new(cfg: ObserverCfg) -> Result<Self> {
        cfg.validate().map_err(eyre::Report::new)?;
        Ok(Self::from_valid(cfg))
    }

    fn from_valid(cfg: ObserverCfg) -> Self {
        Self {
            debouncer: ThresholdDebouncer::new(cfg.threshold_g, cfg.tolerance),
            window: StabilityWindow::new(cfg.history_size, cfg.stability_deviation_g),
            mount: EventRegistry::new(EventKind::Mount.as_str()),
            dismount: EventRegistry::new(EventKind::Dismount.as_str()),
            weighing: EventRegistry::new(EventKind::SuccessfulWeighing.as_str()),
            state: ObserverState::default(),
            cfg,
        }
    }

    pub fn cfg(&self) -> &ObserverCfg {
        &self.cfg
    }

    pub fn state(&self) -> &ObserverState {
        &self.state
    }

    pub fn window(&self) -> &StabilityWindow {
        &self.window
    }

    /// Ingest one sample cycle.
    ///
    /// A non-finite weight is rejected and leaves every piece of state
    /// untouched. A tag record carrying non-finite weights is treated as
    /// if no tag had answered this cycle.
    pub fn update(
        &mut self,
        total_weight_g: f32,
        tag: Option<TagRecord>,
        nfc_present: bool,
    ) -> std::result::Result<Transitions, ObserverError> {
        if !total_weight_g.is_finite() {
            tracing::warn!(weight_g = total_weight_g, "rejecting non-finite sample");
            return Err(ObserverError::InvalidSample(total_weight_g));
        }
        let (tag, nfc_present) = match tag {
            Some(record) if !record.is_well_formed() => {
                tracing::debug!(?record, "malformed tag record; treating as absent");
                (None, false)
            }
            other => (other, nfc_present),
        };

        let mut deferred = Deferred::default();
        let mut transitions = Transitions::default();

        let was_on_scale = self.state.person_on_scale;
        let on_scale = self.debouncer.apply(total_weight_g);
        self.state.person_on_scale = on_scale;
        match (was_on_scale, on_scale) {
            (false, true) => {
                transitions.mounted = true;
                tracing::info!(weight_g = total_weight_g, "subject mounted");
                let report = self.mount.fire(&(), &mut deferred);
                transitions.failed_handlers += report.failed;
            }
            (true, false) => {
                transitions.dismounted = true;
                tracing::info!(weight_g = total_weight_g, "subject dismounted");
                let report = self.dismount.fire(&(), &mut deferred);
                transitions.failed_handlers += report.failed;
            }
            _ => {}
        }

        let was_stable = self.state.is_stable;
        let stable = self.window.push(total_weight_g);
        self.state.is_stable = stable;
        transitions.stabilized = stable && !was_stable;
        if transitions.stabilized && on_scale && nfc_present {
            let event = WeighingEvent {
                total_weight_g,
                reference_weight_g: tag.as_ref().map_or(0.0, |r| r.reference_weight_g),
            };
            transitions.weighed = true;
            tracing::info!(
                total_g = event.total_weight_g,
                reference_g = event.reference_weight_g,
                "successful weighing"
            );
            let report = self.weighing.fire(&event, &mut deferred);
            transitions.failed_handlers += report.failed;
        }

        self.state.total_weight_g = total_weight_g;
        self.state.tag = tag;
        self.state.nfc_present = nfc_present;

        self.apply(deferred);
        Ok(transitions)
    }

    pub fn on_mount<F>(&mut self, id: impl Into<HandlerId>, lifetime: Lifetime, mut f: F)
    where
        F: FnMut(&mut Deferred) + 'static,
    {
        self.mount
            .register(id.into(), lifetime, Box::new(move |_, d| f(d)));
    }

    pub fn on_dismount<F>(&mut self, id: impl Into<HandlerId>, lifetime: Lifetime, mut f: F)
    where
        F: FnMut(&mut Deferred) + 'static,
    {
        self.dismount
            .register(id.into(), lifetime, Box::new(move |_, d| f(d)));
    }

    pub fn on_successful_weighing<F>(&mut self, id: impl Into<HandlerId>, lifetime: Lifetime, f: F)
    where
        F: FnMut(&WeighingEvent, &mut Deferred) + 'static,
    {
        self.weighing.register(id.into(), lifetime, Box::new(f));
    }

    /// Remove a handler immediately; returns whether it was registered.
    pub fn remove(&mut self, kind: EventKind, id: impl Into<HandlerId>) -> bool {
        let id = id.into();
        match kind {
            EventKind::Mount => self.mount.remove(&id),
            EventKind::Dismount => self.dismount.remove(&id),
            EventKind::SuccessfulWeighing => self.weighing.remove(&id),
        }
    }

    /// Remaining budget of a handler, if still registered.
    pub fn lifetime(&self, kind: EventKind, id: impl Into<HandlerId>) -> Option<Lifetime> {
        let id = id.into();
        match kind {
            EventKind::Mount => self.mount.lifetime(&id),
            EventKind::Dismount => self.dismount.lifetime(&id),
            EventKind::SuccessfulWeighing => self.weighing.lifetime(&id),
        }
    }

    fn apply(&mut self, deferred: Deferred) {
        for pending in deferred.pending {
            match pending {
                Pending::Mount(id, lifetime, mut f) => {
                    self.mount
                        .register(id, lifetime, Box::new(move |_, d| f(d)));
                }
                Pending::Dismount(id, lifetime, mut f) => {
                    self.dismount
                        .register(id, lifetime, Box::new(move |_, d| f(d)));
                }
                Pending::Weighing(id, lifetime, f) => self.weighing.register(id, lifetime, f),
                Pending::Remove(kind, id) => {
                    self.remove(kind, id);
                }
            }
        }
    }
}

impl TryFrom<ObserverCfg> for ScaleObserver {
    type Error = BuildError;

    fn try_from(cfg: ObserverCfg) -> std::result::Result<Self, Self::Error> {
        cfg.validate()?;
        Ok(Self::from_valid(cfg))
    }
}
