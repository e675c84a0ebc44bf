use std::time::Duration;
use tracing::trace;

use rollie_traits::{BoxError, WeightSource};

use crate::error::{HwError, Result};
use crate::util::wait_until_ready;

/// Gain 128 on channel A.
pub const GAIN_128_PULSES: u8 = 25;

pub struct Hx711 {
    dt: rppal::gpio::InputPin,
    sck: rppal::gpio::OutputPin,
    gain_pulses: u8, // 25, 26, 27 based on gain/channel
}

impl Hx711 {
    pub fn new(
        dt_pin: rppal::gpio::InputPin,
        mut sck_pin: rppal::gpio::OutputPin,
        gain_pulses: u8,
    ) -> Self {
        sck_pin.set_low(); // clock idle low
        Self {
            dt: dt_pin,
            sck: sck_pin,
            gain_pulses,
        }
    }

    pub fn read_with_timeout(&mut self, timeout: Duration) -> Result<i32> {
        // Data ready when DT goes low
        let dt = &self.dt;
        wait_until_ready(|| dt.is_low(), timeout, Duration::from_micros(200))?;

        let mut value: i32 = 0;
        for _ in 0..24 {
            self.sck.set_high();
            spin_delay_100ns();
            value = (value << 1) | i32::from(self.dt.is_high());
            self.sck.set_low();
            spin_delay_100ns();
        }

        // Gain pulses select the next conversion
        for _ in 0..self.gain_pulses {
            self.sck.set_high();
            spin_delay_100ns();
            self.sck.set_low();
            spin_delay_100ns();
        }

        // Sign extend 24-bit
        if (value & 0x80_0000) != 0 {
            value |= !0xFF_FFFF;
        }
        trace!(raw = value, "hx711 raw read");
        Ok(value)
    }
}

#[inline(always)]
fn spin_delay_100ns() {
    std::hint::spin_loop();
}

/// HX711 load cell converted to grams: `(raw - zero) / ratio`.
pub struct Hx711Scale {
    hx: Hx711,
    zero_counts: f64,
    counts_per_gram: f32,
    timeout: Duration,
}

impl Hx711Scale {
    pub fn open(dt_pin: u8, sck_pin: u8, counts_per_gram: f32, timeout: Duration) -> Result<Self> {
        let gpio = rppal::gpio::Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
        let dt = gpio
            .get(dt_pin)
            .map_err(|e| HwError::Gpio(e.to_string()))?
            .into_input();
        let sck = gpio
            .get(sck_pin)
            .map_err(|e| HwError::Gpio(e.to_string()))?
            .into_output();
        Ok(Self {
            hx: Hx711::new(dt, sck, GAIN_128_PULSES),
            zero_counts: 0.0,
            counts_per_gram,
            timeout,
        })
    }

    fn mean_counts(&mut self, readings: u32) -> Result<f64> {
        let n = readings.max(1);
        let mut sum = 0.0f64;
        for _ in 0..n {
            sum += f64::from(self.read_retrying()?);
        }
        Ok(sum / f64::from(n))
    }

    fn read_retrying(&mut self) -> Result<i32> {
        let max_attempts = 3;
        let mut attempts = 0;
        loop {
            match self.hx.read_with_timeout(self.timeout) {
                Ok(raw) => return Ok(raw),
                Err(HwError::DataReadyTimeout) if attempts < max_attempts => {
                    attempts += 1;
                    tracing::warn!(retries = attempts, "scale timeout, retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl WeightSource for Hx711Scale {
    fn read_mean(&mut self, readings: u32) -> std::result::Result<f32, BoxError> {
        let counts = self.mean_counts(readings)?;
        Ok(((counts - self.zero_counts) / f64::from(self.counts_per_gram)) as f32)
    }

    fn tare(&mut self, readings: u32) -> std::result::Result<(), BoxError> {
        self.zero_counts = self.mean_counts(readings)?;
        tracing::info!(zero_counts = self.zero_counts, "hx711 zeroed");
        Ok(())
    }
}

/// Edge-detecting poller for active-low push buttons.
pub struct GpioButtons {
    pins: Vec<(rppal::gpio::InputPin, bool)>,
}

impl GpioButtons {
    /// Pins are configured with pull-ups; pressed reads low.
    pub fn open(pins: &[u8]) -> Result<Self> {
        let gpio = rppal::gpio::Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
        let pins = pins
            .iter()
            .map(|&p| {
                gpio.get(p)
                    .map(|pin| (pin.into_input_pullup(), false))
                    .map_err(|e| HwError::Gpio(e.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { pins })
    }

    /// Indices (in `open` order) of buttons pressed since the last poll.
    pub fn pressed(&mut self) -> Vec<usize> {
        let mut out = Vec::new();
        for (i, (pin, was_down)) in self.pins.iter_mut().enumerate() {
            let down = pin.is_low();
            if down && !*was_down {
                out.push(i);
            }
            *was_down = down;
        }
        out
    }
}
