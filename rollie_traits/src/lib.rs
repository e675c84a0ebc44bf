//! Collaborator interfaces for the weighing station.
//!
//! The observer core never talks to devices directly; the station loop pulls
//! samples through these traits and pushes rendered readings back out.
pub mod clock;

pub use clock::{Clock, MonotonicClock};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A tag record as read from the subject's identifying tag.
#[derive(Debug, Clone, PartialEq)]
pub struct TagRecord {
    /// Weight carried with the subject (e.g. a wheelchair), in grams.
    pub reference_weight_g: f32,
    /// Previously recorded weights, oldest first.
    pub history: Vec<f32>,
}

impl TagRecord {
    pub fn new(reference_weight_g: f32) -> Self {
        Self {
            reference_weight_g,
            history: Vec::new(),
        }
    }

    /// A record is well-formed when every weight it carries is finite.
    pub fn is_well_formed(&self) -> bool {
        self.reference_weight_g.is_finite() && self.history.iter().all(|w| w.is_finite())
    }
}

/// Result of one tag poll.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagPoll {
    /// Parsed record, if the payload could be decoded.
    pub record: Option<TagRecord>,
    /// Whether a tag answered this cycle. Links report this only alongside a
    /// decoded record; a garbled read is indistinguishable from no tag.
    pub present: bool,
}

impl TagPoll {
    pub fn absent() -> Self {
        Self::default()
    }

    pub fn read(record: TagRecord) -> Self {
        Self {
            record: Some(record),
            present: true,
        }
    }
}

/// Load-cell front end producing averaged readings in grams.
pub trait WeightSource {
    /// Mean of `readings` raw samples, converted to grams.
    fn read_mean(&mut self, readings: u32) -> Result<f32, BoxError>;
    /// Re-zero the source using the mean of `readings` samples.
    fn tare(&mut self, readings: u32) -> Result<(), BoxError>;
}

/// Serial link to the tag reader.
pub trait TagLink {
    /// Non-blocking poll for a tag seen since the previous call.
    fn poll(&mut self) -> Result<TagPoll, BoxError>;
    /// Send a measured weight back to the tag reader.
    fn write_weight(&mut self, grams: f32) -> Result<(), BoxError>;
}

/// Indicator flags shown next to the weight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Indicators {
    pub on_scale: bool,
    pub stable: bool,
    pub tagged: bool,
}

/// Output-only display.
pub trait Display {
    fn show(&mut self, text: &str, indicators: Indicators) -> Result<(), BoxError>;
}

impl<T: WeightSource + ?Sized> WeightSource for Box<T> {
    fn read_mean(&mut self, readings: u32) -> Result<f32, BoxError> {
        (**self).read_mean(readings)
    }
    fn tare(&mut self, readings: u32) -> Result<(), BoxError> {
        (**self).tare(readings)
    }
}

impl<T: TagLink + ?Sized> TagLink for Box<T> {
    fn poll(&mut self) -> Result<TagPoll, BoxError> {
        (**self).poll()
    }
    fn write_weight(&mut self, grams: f32) -> Result<(), BoxError> {
        (**self).write_weight(grams)
    }
}

impl<T: Display + ?Sized> Display for Box<T> {
    fn show(&mut self, text: &str, indicators: Indicators) -> Result<(), BoxError> {
        (**self).show(text, indicators)
    }
}
