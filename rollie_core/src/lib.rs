#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Weighing-station logic (hardware-agnostic).
//!
//! This crate turns a stream of weight samples and tag reads into three
//! events: a subject mounting the scale, the subject dismounting, and a
//! successful weighing. All device access goes through the traits in
//! `rollie_traits`.
//!
//! ## Architecture
//!
//! - **Threshold**: debounced "subject present" flag (`threshold` module)
//! - **Stability**: rolling window deciding when a reading has settled (`stability`)
//! - **Registry**: per-event handlers with invocation budgets (`registry`)
//! - **Observer**: the state machine tying the three together (`observer`)
//! - **Station**: polling loop over real or simulated devices (`runner`, `builder`)

pub mod builder;
pub mod config;
pub mod conversions;
pub mod error;
pub mod hw_error;
pub mod mocks;
pub mod observer;
pub mod registry;
pub mod runner;
pub mod stability;
pub mod threshold;
pub mod util;

pub use builder::{DynStation, Missing, Set, StationBuilder, build_station};
pub use config::{ObserverCfg, StationCfg};
pub use error::{BuildError, ObserverError, Report, Result, RollieError};
pub use observer::{
    Deferred, EventKind, ObserverState, ScaleObserver, Transitions, WeighingEvent,
};
pub use registry::{FireReport, HandlerId, Lifetime};
pub use runner::{
    Button, ButtonSource, CycleOutcome, RECENT_WEIGHINGS, RunSummary, Station, WeighingRecord,
};
pub use stability::StabilityWindow;
pub use threshold::{Side, ThresholdDebouncer};
