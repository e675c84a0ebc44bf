//! `From` implementations bridging `rollie_config` types to `rollie_core` types.

use crate::config::{ObserverCfg, StationCfg};

// ── ObserverCfg ──────────────────────────────────────────────────────────────

impl From<&rollie_config::ObserverCfg> for ObserverCfg {
    fn from(c: &rollie_config::ObserverCfg) -> Self {
        Self {
            threshold_g: c.threshold_g,
            tolerance: c.tolerance,
            history_size: c.history_size,
            stability_deviation_g: c.stability_deviation_g,
        }
    }
}

// ── StationCfg ───────────────────────────────────────────────────────────────

impl From<&rollie_config::SensorCfg> for StationCfg {
    fn from(c: &rollie_config::SensorCfg) -> Self {
        Self {
            readings_per_sample: c.readings_per_sample,
            tare_readings: c.tare_readings,
            sample_rate_hz: c.sample_rate_hz,
            max_consecutive_failures: c.max_consecutive_failures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_observer_and_sensor_sections() {
        let cfg = rollie_config::load_toml(
            r#"
[observer]
threshold_g = 1500.0
tolerance = 4
history_size = 8
stability_deviation_g = 50.0

[sensor]
readings_per_sample = 3
sample_rate_hz = 20
"#,
        )
        .unwrap();
        let obs: ObserverCfg = (&cfg.observer).into();
        assert_eq!(obs.threshold_g, 1500.0);
        assert_eq!(obs.tolerance, 4);
        assert_eq!(obs.history_size, 8);
        assert_eq!(obs.stability_deviation_g, 50.0);

        let station: StationCfg = (&cfg.sensor).into();
        assert_eq!(station.readings_per_sample, 3);
        assert_eq!(station.sample_rate_hz, 20);
        assert_eq!(station.tare_readings, 10);
        assert_eq!(station.max_consecutive_failures, 50);
    }
}
