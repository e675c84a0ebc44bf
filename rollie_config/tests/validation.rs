use rollie_config::load_toml;
use rstest::rstest;

const FULL: &str = r#"
[observer]
threshold_g = 2000.0
tolerance = 3
history_size = 5
stability_deviation_g = 100.0

[sensor]
readings_per_sample = 6
tare_readings = 10
sample_rate_hz = 10
read_timeout_ms = 150
scale_ratio = -21.053

[pins]
hx711_dt = 5
hx711_sck = 6
tare_btn = 17

[tag]
port = "/dev/ttyACM0"
baud_rate = 9600

[logging]
level = "info"
rotation = "daily"
"#;

#[test]
fn full_config_parses_and_validates() {
    let cfg = load_toml(FULL).expect("parse TOML");
    cfg.validate().expect("valid config should pass");
    assert_eq!(cfg.pins.hx711_dt, Some(5));
    assert_eq!(cfg.pins.register_btn, None);
    assert_eq!(cfg.tag.port.as_deref(), Some("/dev/ttyACM0"));
    assert_eq!(cfg.logging.rotation.as_deref(), Some("daily"));
}

#[test]
fn empty_file_yields_valid_defaults() {
    let cfg = load_toml("").expect("parse TOML");
    cfg.validate().expect("defaults should pass");
    assert_eq!(cfg.observer.threshold_g, 2000.0);
    assert_eq!(cfg.observer.tolerance, 3);
    assert_eq!(cfg.observer.history_size, 5);
    assert_eq!(cfg.sensor.readings_per_sample, 6);
    assert_eq!(cfg.tag.baud_rate, 9600);
    assert!(cfg.tag.port.is_none());
}

#[rstest]
#[case("[observer]\ntolerance = 0", "observer.tolerance must be >= 1")]
#[case("[observer]\nhistory_size = 0", "observer.history_size must be >= 1")]
#[case("[observer]\nthreshold_g = -1.0", "observer.threshold_g must be >= 0")]
#[case(
    "[observer]\nstability_deviation_g = -5.0",
    "observer.stability_deviation_g must be >= 0"
)]
#[case("[sensor]\nsample_rate_hz = 0", "sensor.sample_rate_hz must be > 0")]
#[case("[sensor]\nreadings_per_sample = 0", "sensor.readings_per_sample must be >= 1")]
#[case("[sensor]\ntare_readings = 0", "sensor.tare_readings must be >= 1")]
#[case("[sensor]\nread_timeout_ms = 0", "sensor.read_timeout_ms must be >= 1")]
#[case("[sensor]\nscale_ratio = 0.0", "sensor.scale_ratio must be finite and non-zero")]
#[case("[tag]\nbaud_rate = 0", "tag.baud_rate must be > 0")]
#[case("[logging]\nrotation = \"weekly\"", "logging.rotation must be one of")]
fn rejects_invalid_values(#[case] toml: &str, #[case] expected: &str) {
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should be rejected");
    assert!(
        format!("{err}").contains(expected),
        "got {err}, expected {expected}"
    );
}

#[test]
fn rejects_wrong_types() {
    assert!(load_toml("[observer]\ntolerance = \"three\"").is_err());
    assert!(load_toml("[sensor]\nsample_rate_hz = -1").is_err());
}
