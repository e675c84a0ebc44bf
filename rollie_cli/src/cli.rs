//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

/// Config path used when `--config` is not given; a missing file means defaults.
pub const DEFAULT_CONFIG: &str = "etc/rollie.toml";

#[derive(Parser, Debug)]
#[command(name = "rollie", version, about = "Wheelchair weighing station")]
pub struct Cli {
    /// Path to config TOML [default: etc/rollie.toml if present]
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log and report as JSON lines instead of pretty text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); overrides [logging].level
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the weighing station
    Run {
        /// Replay recorded samples from a `weight_g,tag_g` CSV instead of live devices
        #[arg(long, value_name = "FILE")]
        replay: Option<PathBuf>,
        /// Stop after this many cycles [default: all replay rows, or until Ctrl-C]
        #[arg(long, value_name = "N")]
        cycles: Option<u64>,
    },
    /// Validate the config and check that devices can be opened
    SelfCheck,
}
