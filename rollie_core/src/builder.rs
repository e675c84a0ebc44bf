//! Type-state builder for `Station` and generic `build_station` constructor.
//!
//! The builder enforces at compile time that a weight source, tag link, and
//! display are provided before `build()` is available. `try_build()` is
//! always available for dynamic checks.

use std::marker::PhantomData;

use rollie_traits::clock::{Clock, MonotonicClock};
use rollie_traits::{Display, TagLink, WeightSource};

use crate::config::{ObserverCfg, StationCfg};
use crate::error::{BuildError, Result};
use crate::observer::ScaleObserver;
use crate::runner::Station;

/// Station over boxed collaborators, as produced by [`StationBuilder`].
pub type DynStation = Station<Box<dyn WeightSource>, Box<dyn TagLink>, Box<dyn Display>>;

// ── Type-state markers ───────────────────────────────────────────────────────

pub struct Missing;
pub struct Set;

/// Builder for [`DynStation`]. Both configs are validated on `build()`.
pub struct StationBuilder<W, T, D> {
    scale: Option<Box<dyn WeightSource>>,
    tags: Option<Box<dyn TagLink>>,
    display: Option<Box<dyn Display>>,
    observer: Option<ObserverCfg>,
    station: Option<StationCfg>,
    clock: Option<Box<dyn Clock + Send + Sync>>,
    _w: PhantomData<W>,
    _t: PhantomData<T>,
    _d: PhantomData<D>,
}

impl Default for StationBuilder<Missing, Missing, Missing> {
    fn default() -> Self {
        Self {
            scale: None,
            tags: None,
            display: None,
            observer: None,
            station: None,
            clock: None,
            _w: PhantomData,
            _t: PhantomData,
            _d: PhantomData,
        }
    }
}

impl DynStation {
    /// Start building a station.
    pub fn builder() -> StationBuilder<Missing, Missing, Missing> {
        StationBuilder::default()
    }
}

fn validate_and_build<W, T, D>(
    scale: W,
    tags: T,
    display: D,
    observer: ObserverCfg,
    station: StationCfg,
    clock: Option<Box<dyn Clock + Send + Sync>>,
) -> Result<Station<W, T, D>>
where
    W: WeightSource,
    T: TagLink,
    D: Display,
{
    station.validate().map_err(eyre::Report::new)?;
    let observer = ScaleObserver::new(observer)?;
    let clock = clock.unwrap_or_else(|| Box::new(MonotonicClock::new()));
    Ok(Station::assemble(scale, tags, display, observer, station, clock))
}

impl<W, T, D> StationBuilder<W, T, D> {
    /// Fallible build available in any type-state; reports the first missing piece.
    pub fn try_build(self) -> Result<DynStation> {
        let scale = self
            .scale
            .ok_or_else(|| eyre::Report::new(BuildError::MissingScale))?;
        let tags = self
            .tags
            .ok_or_else(|| eyre::Report::new(BuildError::MissingTagLink))?;
        let display = self
            .display
            .ok_or_else(|| eyre::Report::new(BuildError::MissingDisplay))?;
        validate_and_build(
            scale,
            tags,
            display,
            self.observer.unwrap_or_default(),
            self.station.unwrap_or_default(),
            self.clock,
        )
    }

    fn retype<W2, T2, D2>(self) -> StationBuilder<W2, T2, D2> {
        StationBuilder {
            scale: self.scale,
            tags: self.tags,
            display: self.display,
            observer: self.observer,
            station: self.station,
            clock: self.clock,
            _w: PhantomData,
            _t: PhantomData,
            _d: PhantomData,
        }
    }
}

/// Chainable setters that do not affect type-state.
impl<W, T, D> StationBuilder<W, T, D> {
    pub fn with_observer_cfg(mut self, cfg: ObserverCfg) -> Self {
        self.observer = Some(cfg);
        self
    }
    pub fn with_station_cfg(mut self, cfg: StationCfg) -> Self {
        self.station = Some(cfg);
        self
    }
    /// Provide a custom clock implementation; defaults to `MonotonicClock` when not provided.
    pub fn with_clock(mut self, clock: Box<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }
}

// Setters that advance type-state
impl<T, D> StationBuilder<Missing, T, D> {
    pub fn with_scale(self, scale: impl WeightSource + 'static) -> StationBuilder<Set, T, D> {
        let mut next = self.retype();
        next.scale = Some(Box::new(scale));
        next
    }
}

impl<W, D> StationBuilder<W, Missing, D> {
    pub fn with_tag_link(self, tags: impl TagLink + 'static) -> StationBuilder<W, Set, D> {
        let mut next = self.retype();
        next.tags = Some(Box::new(tags));
        next
    }
}

impl<W, T> StationBuilder<W, T, Missing> {
    pub fn with_display(self, display: impl Display + 'static) -> StationBuilder<W, T, Set> {
        let mut next = self.retype();
        next.display = Some(Box::new(display));
        next
    }
}

impl StationBuilder<Set, Set, Set> {
    /// Validate and build. Only available once every collaborator is set.
    pub fn build(self) -> Result<DynStation> {
        self.try_build()
    }
}

/// Build a statically-dispatched station from concrete collaborators.
pub fn build_station<W, T, D>(
    scale: W,
    tags: T,
    display: D,
    observer: ObserverCfg,
    station: StationCfg,
    clock: Option<Box<dyn Clock + Send + Sync>>,
) -> Result<Station<W, T, D>>
where
    W: WeightSource,
    T: TagLink,
    D: Display,
{
    validate_and_build(scale, tags, display, observer, station, clock)
}
