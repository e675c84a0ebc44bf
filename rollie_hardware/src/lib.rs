//! Device layer for the weighing station: simulated devices, the serial tag
//! link, and (with the `hardware` feature) the HX711 load cell and GPIO
//! buttons on a Raspberry Pi.
pub mod error;
#[cfg(feature = "hardware")]
pub mod hx711;
pub mod serial;
pub mod sim;
pub mod tag;
pub mod util;

pub use serial::SerialTagLink;
pub use sim::{ConsoleDisplay, ScaleHandle, SimulatedScale, SimulatedTagLink};
pub use tag::parse_tag_line;

#[cfg(feature = "hardware")]
pub use hx711::{GpioButtons, Hx711Scale};
