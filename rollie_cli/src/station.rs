//! Station assembly: config mapping, device selection, and the run itself.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use eyre::WrapErr;
use rollie_config::{Config, ReplayRow};
use rollie_core::error::{Result, RollieError};
use rollie_core::mocks::{NoTagLink, NullDisplay};
use rollie_core::{DynStation, Missing, ObserverCfg, RunSummary, StationBuilder, StationCfg};
use rollie_hardware::{ConsoleDisplay, SimulatedScale, SimulatedTagLink};
use rollie_traits::clock::ManualClock;
use rollie_traits::{Display, TagLink, TagPoll, TagRecord};

type Builder = StationBuilder<Missing, Missing, Missing>;

fn builder(cfg: &Config) -> Builder {
    let observer: ObserverCfg = (&cfg.observer).into();
    let station: StationCfg = (&cfg.sensor).into();
    DynStation::builder()
        .with_observer_cfg(observer)
        .with_station_cfg(station)
}

fn display(json: bool) -> Box<dyn Display> {
    // stdout carries the JSON summary in --json mode
    if json {
        Box::new(NullDisplay)
    } else {
        Box::new(ConsoleDisplay::stdout())
    }
}

/// Simulated devices replaying recorded rows, one row per cycle.
pub fn replay_devices(rows: &[ReplayRow]) -> (SimulatedScale, SimulatedTagLink) {
    let scale = SimulatedScale::scripted(rows.iter().map(|r| r.weight_g));
    let tags = SimulatedTagLink::scripted(rows.iter().map(|r| match r.tag_g {
        Some(g) => TagPoll::read(TagRecord::new(g)),
        None => TagPoll::absent(),
    }));
    (scale, tags)
}

fn tag_link(cfg: &Config) -> Result<Box<dyn TagLink>> {
    let Some(port) = cfg.tag.port.as_deref() else {
        tracing::info!("no tag reader configured");
        return Ok(Box::new(NoTagLink));
    };
    #[cfg(feature = "hardware")]
    let link = rollie_hardware::serial::open_uart(Path::new(port), cfg.tag.baud_rate);
    #[cfg(not(feature = "hardware"))]
    let link = rollie_hardware::SerialTagLink::open(Path::new(port));
    let link = link
        .map_err(|e| eyre::Report::new(RollieError::Hardware(e.to_string())))
        .wrap_err_with(|| format!("open tag reader {port}"))?;
    Ok(Box::new(link))
}

#[cfg(feature = "hardware")]
fn live_station(cfg: &Config, json: bool) -> Result<DynStation> {
    use rollie_core::Button;
    use std::time::Duration;

    let (Some(dt), Some(sck)) = (cfg.pins.hx711_dt, cfg.pins.hx711_sck) else {
        return Err(eyre::Report::new(RollieError::Config(
            "pins.hx711_dt and pins.hx711_sck are required with the hardware backend".into(),
        )));
    };
    let mut scale = rollie_hardware::Hx711Scale::open(
        dt,
        sck,
        cfg.sensor.scale_ratio,
        Duration::from_millis(cfg.sensor.read_timeout_ms),
    )
    .map_err(|e| eyre::Report::new(RollieError::Hardware(e.to_string())))
    .wrap_err("open hx711")?;
    rollie_traits::WeightSource::tare(&mut scale, cfg.sensor.tare_readings)
        .map_err(|e| eyre::Report::new(rollie_core::hw_error::map_boxed(&e)))
        .wrap_err("initial tare")?;

    let mut station = builder(cfg)
        .with_scale(scale)
        .with_tag_link(tag_link(cfg)?)
        .with_display(display(json))
        .build()?;

    let wired: Vec<(u8, Button)> = [
        (cfg.pins.tare_btn, Button::Tare),
        (cfg.pins.register_btn, Button::Register),
    ]
    .into_iter()
    .filter_map(|(pin, b)| pin.map(|p| (p, b)))
    .collect();
    if !wired.is_empty() {
        let pins: Vec<u8> = wired.iter().map(|(p, _)| *p).collect();
        let mut buttons = rollie_hardware::GpioButtons::open(&pins)
            .map_err(|e| eyre::Report::new(RollieError::Hardware(e.to_string())))
            .wrap_err("open button pins")?;
        station.set_button_source(Box::new(move || {
            buttons.pressed().into_iter().map(|i| wired[i].1).collect()
        }));
    }
    Ok(station)
}

#[cfg(not(feature = "hardware"))]
fn live_station(cfg: &Config, json: bool) -> Result<DynStation> {
    tracing::info!("simulation backend: idle scale");
    builder(cfg)
        .with_scale(SimulatedScale::default())
        .with_tag_link(tag_link(cfg)?)
        .with_display(display(json))
        .build()
}

fn load_replay(path: &Path) -> Result<Vec<ReplayRow>> {
    rollie_config::load_replay_csv(path)
        .map_err(|e| eyre::Report::new(RollieError::Config(e.to_string())))
        .wrap_err_with(|| format!("load replay {}", path.display()))
}

pub fn run_station(
    cfg: &Config,
    replay: Option<&Path>,
    cycles: Option<u64>,
    json: bool,
    shutdown: Arc<AtomicBool>,
) -> Result<RunSummary> {
    let (mut station, max_cycles) = match replay {
        Some(path) => {
            let rows = load_replay(path)?;
            let (scale, tags) = replay_devices(&rows);
            // Replays run as fast as the observer allows.
            let station = builder(cfg)
                .with_scale(scale)
                .with_tag_link(tags)
                .with_display(display(json))
                .with_clock(Box::new(ManualClock::new()))
                .build()?;
            tracing::info!(rows = rows.len(), path = %path.display(), "replaying");
            (station, Some(cycles.unwrap_or(rows.len() as u64)))
        }
        None => (live_station(cfg, json)?, cycles),
    };
    station.run(max_cycles, &shutdown)
}

/// Build the station without running it.
pub fn self_check(cfg: &Config, json: bool) -> Result<()> {
    let station = live_station(cfg, json)?;
    tracing::debug!(?station, "self-check station assembled");
    Ok(())
}
