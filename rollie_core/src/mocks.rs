//! Stand-in collaborators for stations that run without a tag reader or a
//! display attached.

use rollie_traits::{BoxError, Display, Indicators, TagLink, TagPoll};

/// A tag link with no reader behind it; never reports a tag.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTagLink;

impl TagLink for NoTagLink {
    fn poll(&mut self) -> Result<TagPoll, BoxError> {
        Ok(TagPoll::absent())
    }

    fn write_weight(&mut self, _grams: f32) -> Result<(), BoxError> {
        Err("no tag reader attached".into())
    }
}

/// A display that drops everything it is given.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDisplay;

impl Display for NullDisplay {
    fn show(&mut self, _text: &str, _indicators: Indicators) -> Result<(), BoxError> {
        Ok(())
    }
}
