#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|line: &str| {
    if let Some(record) = rollie_hardware::parse_tag_line(line) {
        assert!(record.is_well_formed());
    }
});
