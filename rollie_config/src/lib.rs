#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema and replay parsing for the weighing station.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//!   Every section has defaults, so an empty file is a usable sim config.
//! - The replay CSV loader enforces headers and rejects non-finite weights.
use serde::Deserialize;

/// Replay CSV schema.
///
/// Expected headers:
/// weight_g,tag_g
///
/// `tag_g` is empty on rows where no tag answered.
///
/// Example:
/// weight_g,tag_g
/// 0.0,
/// 81200.5,12000
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct ReplayRow {
    pub weight_g: f32,
    pub tag_g: Option<f32>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ObserverCfg {
    pub threshold_g: f32,
    pub tolerance: u32,
    pub history_size: usize,
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

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SensorCfg {
    /// Raw readings averaged into one sample.
    pub readings_per_sample: u32,
    /// Raw readings averaged when taring.
    pub tare_readings: u32,
    pub sample_rate_hz: u32,
    /// Max time to wait for HX711 data-ready (DT low) before failing
    pub read_timeout_ms: u64,
    /// Raw counts per gram; negative when the cell is wired inverted.
    pub scale_ratio: f32,
    /// Consecutive failed reads before the station gives up (0 disables)
    pub max_consecutive_failures: u32,
}

impl Default for SensorCfg {
    fn default() -> Self {
        Self {
            readings_per_sample: 6,
            tare_readings: 10,
            sample_rate_hz: 10,
            read_timeout_ms: 150,
            scale_ratio: -21.053,
            max_consecutive_failures: 50,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Pins {
    pub hx711_dt: Option<u8>,
    pub hx711_sck: Option<u8>,
    pub tare_btn: Option<u8>,
    pub register_btn: Option<u8>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TagCfg {
    /// Serial device of the tag reader, e.g. "/dev/ttyACM0". Unset means no reader.
    pub port: Option<String>,
    pub baud_rate: u32,
}

impl Default for TagCfg {
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: 9600,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub observer: ObserverCfg,
    pub sensor: SensorCfg,
    pub pins: Pins,
    pub tag: TagCfg,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

pub fn load_replay_csv(path: &std::path::Path) -> eyre::Result<Vec<ReplayRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open replay CSV {:?}: {}", path, e))?;

    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let expected = ["weight_g", "tag_g"];
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    if actual != expected {
        eyre::bail!(
            "replay CSV must have headers 'weight_g,tag_g', got: {}",
            actual.join(",")
        );
    }

    let mut rows = Vec::new();
    for (idx, rec) in rdr.deserialize::<ReplayRow>().enumerate() {
        let row = rec.map_err(|e| eyre::eyre!("invalid CSV row {}: {}", idx + 2, e))?;
        if !row.weight_g.is_finite() {
            eyre::bail!("invalid CSV row {}: weight_g must be finite", idx + 2);
        }
        rows.push(row);
    }
    if rows.is_empty() {
        eyre::bail!("replay CSV {:?} has no rows", path);
    }
    Ok(rows)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Observer
        if !self.observer.threshold_g.is_finite() {
            eyre::bail!("observer.threshold_g must be finite");
        }
        if self.observer.threshold_g < 0.0 {
            eyre::bail!("observer.threshold_g must be >= 0");
        }
        if self.observer.tolerance == 0 {
            eyre::bail!("observer.tolerance must be >= 1");
        }
        if self.observer.history_size == 0 {
            eyre::bail!("observer.history_size must be >= 1");
        }
        if !self.observer.stability_deviation_g.is_finite()
            || self.observer.stability_deviation_g < 0.0
        {
            eyre::bail!("observer.stability_deviation_g must be >= 0");
        }

        // Sensor
        if self.sensor.readings_per_sample == 0 {
            eyre::bail!("sensor.readings_per_sample must be >= 1");
        }
        if self.sensor.tare_readings == 0 {
            eyre::bail!("sensor.tare_readings must be >= 1");
        }
        if self.sensor.sample_rate_hz == 0 {
            eyre::bail!("sensor.sample_rate_hz must be > 0");
        }
        if self.sensor.read_timeout_ms == 0 {
            eyre::bail!("sensor.read_timeout_ms must be >= 1");
        }
        if !self.sensor.scale_ratio.is_finite() || self.sensor.scale_ratio == 0.0 {
            eyre::bail!("sensor.scale_ratio must be finite and non-zero");
        }

        // Tag
        if self.tag.baud_rate == 0 {
            eyre::bail!("tag.baud_rate must be > 0");
        }

        // Logging
        if let Some(rotation) = self.logging.rotation.as_deref()
            && !matches!(rotation, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly, got {rotation:?}");
        }

        Ok(())
    }
}
