//! Human-readable error descriptions and structured JSON error formatting.

use rollie_core::error::{BuildError, ObserverError, RollieError};

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingScale => {
                "What happened: No weight source was provided to the station.\nLikely causes: The load cell failed to initialize or was not wired into the builder.\nHow to fix: Ensure the HX711 is created successfully and passed via with_scale(...).".to_string()
            }
            BuildError::MissingTagLink => {
                "What happened: No tag link was provided to the station.\nLikely causes: The tag reader was not wired into the builder.\nHow to fix: Pass a tag link via with_tag_link(...), or NoTagLink to run without one.".to_string()
            }
            BuildError::MissingDisplay => {
                "What happened: No display was provided to the station.\nLikely causes: The display was not wired into the builder.\nHow to fix: Pass a display via with_display(...), or NullDisplay to run headless.".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun. See etc/rollie.toml for a sample."
            ),
        };
    }

    if let Some(re) = err.downcast_ref::<RollieError>() {
        return match re {
            RollieError::Timeout => "What happened: The weight source stopped answering.\nLikely causes: HX711 not wired correctly, no power/ground, or sensor.read_timeout_ms too low.\nHow to fix: Verify DT/SCK pins and power, and consider raising sensor.read_timeout_ms or sensor.max_consecutive_failures.".to_string(),
            RollieError::Config(msg) => format!(
                "What happened: Configuration is invalid ({msg}).\nLikely causes: A typo, a wrong type, or an out-of-range value.\nHow to fix: Edit the file and try again; `rollie self-check` validates without running."
            ),
            RollieError::Hardware(msg) | RollieError::HardwareFault(msg) => format!(
                "What happened: A device failed ({msg}).\nLikely causes: Wrong pins or port, missing permissions, or a disconnected cable.\nHow to fix: Check [pins] and [tag] in the config and that the process may access GPIO and the serial port."
            ),
            RollieError::Observer(ObserverError::InvalidSample(w)) => format!(
                "What happened: The scale produced an unusable reading ({w}).\nLikely causes: Electrical noise or a failing load cell.\nHow to fix: Check the load cell wiring and re-tare."
            ),
            RollieError::State(msg) => format!(
                "What happened: {msg}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    // Generic fallback
    let msg = err.to_string();
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: 3 config, 4 device timeout, 5 other device failure, 1 anything else.
/// (2 is left to clap usage errors.)
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if err.downcast_ref::<BuildError>().is_some() {
        return 3;
    }
    match err.downcast_ref::<RollieError>() {
        Some(RollieError::Config(_)) => 3,
        Some(RollieError::Timeout) => 4,
        Some(RollieError::Hardware(_) | RollieError::HardwareFault(_)) => 5,
        _ => 1,
    }
}

fn reason_name(err: &eyre::Report) -> &'static str {
    if err.downcast_ref::<BuildError>().is_some() {
        return "Config";
    }
    match err.downcast_ref::<RollieError>() {
        Some(RollieError::Config(_)) => "Config",
        Some(RollieError::Timeout) => "Timeout",
        Some(RollieError::Hardware(_) | RollieError::HardwareFault(_)) => "Hardware",
        Some(RollieError::Observer(_)) => "InvalidSample",
        _ => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    serde_json::json!({
        "reason": reason_name(err),
        "message": humanize(err),
        "chain": err.chain().map(ToString::to_string).collect::<Vec<_>>(),
    })
    .to_string()
}
