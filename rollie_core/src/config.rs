//! Runtime configuration types for the observer and the station loop.
//!
//! These are separate from the TOML-deserialized config in `rollie_config`;
//! see `conversions` for the bridge.

use crate::error::BuildError;

/// Observer thresholds, fixed for the lifetime of a `ScaleObserver`.
#[derive(Debug, Clone, PartialEq)]
pub struct ObserverCfg {
    /// A sample strictly above this weight counts as "subject present".
    pub threshold_g: f32,
    /// Consecutive agreeing samples needed before presence flips.
    /// 0 and 1 both mean "flip on the first sample".
    pub tolerance: u32,
    /// Number of samples the stability window holds.
    pub history_size: usize,
    /// Max absolute deviation from the window mean for a stable reading.
    pub stability_deviation_g: f32,
}

impl Default for ObserverCfg {
    fn default() -> Self {
        Self {
            threshold_g: 2000.0,
            tolerance: 3,
            history_size: 5,
            stability_deviation_g: 100.0,
        }
    }
}

impl ObserverCfg {
    pub fn validate(&self) -> Result<(), BuildError> {
        if !self.threshold_g.is_finite() {
            return Err(BuildError::InvalidConfig("threshold_g must be finite"));
        }
        if self.history_size == 0 {
            return Err(BuildError::InvalidConfig("history_size must be >= 1"));
        }
        if !self.stability_deviation_g.is_finite() || self.stability_deviation_g < 0.0 {
            return Err(BuildError::InvalidConfig(
                "stability_deviation_g must be finite and >= 0",
            ));
        }
        Ok(())
    }
}

/// Polling-loop settings for the station runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationCfg {
    /// Raw readings averaged into one sample.
    pub readings_per_sample: u32,
    /// Raw readings averaged when taring.
    pub tare_readings: u32,
    /// Cycle rate of the polling loop.
    pub sample_rate_hz: u32,
    /// Consecutive failed weight reads before `run` gives up; 0 never gives up.
    pub max_consecutive_failures: u32,
}

impl Default for StationCfg {
    fn default() -> Self {
        Self {
            readings_per_sample: 6,
            tare_readings: 10,
            sample_rate_hz: 10,
            max_consecutive_failures: 50,
        }
    }
}

impl StationCfg {
    pub fn validate(&self) -> Result<(), BuildError> {
        if self.readings_per_sample == 0 {
            return Err(BuildError::InvalidConfig("readings_per_sample must be >= 1"));
        }
        if self.tare_readings == 0 {
            return Err(BuildError::InvalidConfig("tare_readings must be >= 1"));
        }
        if self.sample_rate_hz == 0 {
            return Err(BuildError::InvalidConfig("sample_rate_hz must be > 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(ObserverCfg::default().validate().is_ok());
        assert!(StationCfg::default().validate().is_ok());
    }

    #[test]
    fn zero_tolerance_is_accepted() {
        let cfg = ObserverCfg {
            tolerance: 0,
            ..ObserverCfg::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_empty_window_and_negative_deviation() {
        let cfg = ObserverCfg {
            history_size: 0,
            ..ObserverCfg::default()
        };
        assert!(matches!(cfg.validate(), Err(BuildError::InvalidConfig(_))));

        let cfg = ObserverCfg {
            stability_deviation_g: -1.0,
            ..ObserverCfg::default()
        };
        assert!(matches!(cfg.validate(), Err(BuildError::InvalidConfig(_))));

        let cfg = ObserverCfg {
            threshold_g: f32::NAN,
            ..ObserverCfg::default()
        };
        assert!(matches!(cfg.validate(), Err(BuildError::InvalidConfig(_))));
    }
}
