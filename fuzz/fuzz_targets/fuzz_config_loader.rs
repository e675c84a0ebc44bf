#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parse and validation errors are fine; panics are not.
    if let Ok(cfg) = toml::from_str::<rollie_config::Config>(data) {
        let _ = cfg.validate();
    }
    let _ = rollie_config::load_toml(data);
});
