//! Simulated devices for running the station without hardware.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::io::Write;
use std::rc::Rc;

use rollie_traits::{BoxError, Display, Indicators, TagLink, TagPoll, WeightSource};

use crate::error::HwError;

/// Live controls for a [`SimulatedScale`] that has been moved into a station.
#[derive(Debug, Clone)]
pub struct ScaleHandle {
    weight: Rc<Cell<f32>>,
    faults: Rc<Cell<u32>>,
}

impl ScaleHandle {
    /// Weight returned once the script is exhausted.
    pub fn set_weight(&self, grams: f32) {
        self.weight.set(grams);
    }

    /// Fail the next `n` reads with a timeout.
    pub fn inject_faults(&self, n: u32) {
        self.faults.set(n);
    }
}

/// Simulated load cell.
///
/// Scripted weights are consumed one per `read_mean` call; after the script
/// runs out the last value (or the value set through a [`ScaleHandle`]) is
/// held. Readings are reported relative to the tare offset.
#[derive(Debug)]
pub struct SimulatedScale {
    script: VecDeque<f32>,
    weight: Rc<Cell<f32>>,
    faults: Rc<Cell<u32>>,
    offset_g: f32,
}

impl Default for SimulatedScale {
    fn default() -> Self {
        Self::constant(0.0)
    }
}

impl SimulatedScale {
    pub fn constant(grams: f32) -> Self {
        Self {
            script: VecDeque::new(),
            weight: Rc::new(Cell::new(grams)),
            faults: Rc::new(Cell::new(0)),
            offset_g: 0.0,
        }
    }

    pub fn scripted(weights: impl IntoIterator<Item = f32>) -> Self {
        Self {
            script: weights.into_iter().collect(),
            ..Self::constant(0.0)
        }
    }

    pub fn handle(&self) -> ScaleHandle {
        ScaleHandle {
            weight: self.weight.clone(),
            faults: self.faults.clone(),
        }
    }

    fn raw(&mut self) -> f32 {
        if let Some(next) = self.script.pop_front() {
            self.weight.set(next);
        }
        self.weight.get()
    }
}

impl WeightSource for SimulatedScale {
    fn read_mean(&mut self, _readings: u32) -> Result<f32, BoxError> {
        let pending = self.faults.get();
        if pending > 0 {
            self.faults.set(pending - 1);
            return Err(Box::new(HwError::Timeout));
        }
        let grams = self.raw() - self.offset_g;
        tracing::trace!(grams, "simulated read");
        Ok(grams)
    }

    fn tare(&mut self, _readings: u32) -> Result<(), BoxError> {
        self.offset_g = self.weight.get();
        Ok(())
    }
}

/// Simulated tag reader replaying one scripted poll per cycle.
///
/// Weights written back are collected and visible through [`Self::written`].
#[derive(Debug, Default)]
pub struct SimulatedTagLink {
    script: VecDeque<TagPoll>,
    written: Rc<RefCell<Vec<f32>>>,
}

impl SimulatedTagLink {
    pub fn scripted(polls: impl IntoIterator<Item = TagPoll>) -> Self {
        Self {
            script: polls.into_iter().collect(),
            written: Rc::default(),
        }
    }

    /// Shared view of every weight written to the tag so far.
    pub fn written(&self) -> Rc<RefCell<Vec<f32>>> {
        self.written.clone()
    }
}

impl TagLink for SimulatedTagLink {
    fn poll(&mut self) -> Result<TagPoll, BoxError> {
        Ok(self.script.pop_front().unwrap_or_default())
    }

    fn write_weight(&mut self, grams: f32) -> Result<(), BoxError> {
        self.written.borrow_mut().push(grams);
        Ok(())
    }
}

/// Text display writing one line per change.
pub struct ConsoleDisplay<W: Write> {
    out: W,
    last: Option<(String, Indicators)>,
}

impl ConsoleDisplay<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> ConsoleDisplay<W> {
    pub fn new(out: W) -> Self {
        Self { out, last: None }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn flag(on: bool, c: char) -> char {
    if on { c } else { '-' }
}

impl<W: Write> Display for ConsoleDisplay<W> {
    fn show(&mut self, text: &str, indicators: Indicators) -> Result<(), BoxError> {
        if self
            .last
            .as_ref()
            .is_some_and(|(t, i)| t == text && *i == indicators)
        {
            return Ok(());
        }
        writeln!(
            self.out,
            "{text} [{}{}{}]",
            flag(indicators.on_scale, 'M'),
            flag(indicators.stable, 'S'),
            flag(indicators.tagged, 'T'),
        )
        .map_err(HwError::Io)?;
        self.last = Some((text.to_owned(), indicators));
        Ok(())
    }
}
