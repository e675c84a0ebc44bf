#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! `rollie`: weighing-station command line.

mod cli;
mod error_fmt;
mod logging;
mod station;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use eyre::WrapErr;
use rollie_core::RunSummary;
use rollie_core::error::RollieError;

use crate::cli::{Cli, Commands, DEFAULT_CONFIG, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};

fn config_error(e: impl std::fmt::Display) -> eyre::Report {
    eyre::Report::new(RollieError::Config(e.to_string()))
}

/// Read and validate the config. Only the implicit default path may be absent.
fn load_config(explicit: Option<&Path>) -> eyre::Result<rollie_config::Config> {
    let path = explicit.map_or_else(|| PathBuf::from(DEFAULT_CONFIG), Path::to_path_buf);
    let cfg = match std::fs::read_to_string(&path) {
        Ok(text) => rollie_config::load_toml(&text)
            .map_err(config_error)
            .wrap_err_with(|| format!("parse {}", path.display()))?,
        Err(e) if explicit.is_none() && e.kind() == std::io::ErrorKind::NotFound => {
            rollie_config::Config::default()
        }
        Err(e) => {
            return Err(config_error(e)).wrap_err_with(|| format!("read {}", path.display()));
        }
    };
    cfg.validate()
        .map_err(config_error)
        .wrap_err_with(|| format!("validate {}", path.display()))?;
    Ok(cfg)
}

fn print_summary(summary: &RunSummary, json: bool) {
    if json {
        let recent: Vec<_> = summary
            .recent_weighings
            .iter()
            .map(|w| {
                serde_json::json!({
                    "total_g": w.total_weight_g,
                    "reference_g": w.reference_weight_g,
                    "net_g": w.net_weight_g,
                })
            })
            .collect();
        println!(
            "{}",
            serde_json::json!({
                "cycles": summary.cycles,
                "skipped": summary.skipped,
                "rejected": summary.rejected,
                "mounts": summary.mounts,
                "dismounts": summary.dismounts,
                "weighings": summary.weighings,
                "recent_weighings": recent,
            })
        );
        return;
    }
    println!(
        "cycles: {} (skipped {}, rejected {})",
        summary.cycles, summary.skipped, summary.rejected
    );
    println!("mounts: {}, dismounts: {}", summary.mounts, summary.dismounts);
    println!("successful weighings: {}", summary.weighings);
    // Numbered over the whole run; only the tail is kept.
    let first = summary.weighings - summary.recent_weighings.len() as u64 + 1;
    for (n, w) in (first..).zip(&summary.recent_weighings) {
        println!(
            "  #{}: net {} (total {})",
            n,
            rollie_core::util::format_weight(w.net_weight_g).trim_start(),
            rollie_core::util::format_weight(w.total_weight_g).trim_start(),
        );
    }
}

fn real_main(cli: Cli) -> eyre::Result<()> {
    let cfg = load_config(cli.config.as_deref())?;
    let level = cli
        .log_level
        .as_deref()
        .or(cfg.logging.level.as_deref())
        .unwrap_or("info");
    let _log_guard = logging::init(cli.json, level, &cfg.logging)?;

    match cli.cmd {
        Commands::Run { replay, cycles } => {
            let shutdown = Arc::new(AtomicBool::new(false));
            let flag = shutdown.clone();
            ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
                .wrap_err("install Ctrl-C handler")?;
            let summary =
                station::run_station(&cfg, replay.as_deref(), cycles, cli.json, shutdown)?;
            print_summary(&summary, cli.json);
        }
        Commands::SelfCheck => {
            station::self_check(&cfg, cli.json)?;
            if cli.json {
                println!("{}", serde_json::json!({ "status": "ok" }));
            } else {
                println!("ok");
            }
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);
    let _ = color_eyre::install();

    if let Err(err) = real_main(cli) {
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", format_error_json(&err));
        } else {
            eprintln!("{}", humanize(&err));
        }
        std::process::exit(exit_code_for_error(&err));
    }
}
