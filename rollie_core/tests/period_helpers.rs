use rollie_core::util::{format_weight, period_us};
use rstest::rstest;

#[rstest]
#[case(1, 1_000_000)]
#[case(10, 100_000)]
#[case(3, 333_333)]
#[case(1_000_000, 1)]
#[case(u32::MAX, 1)]
fn period_us_divides_and_floors(#[case] hz: u32, #[case] expected: u64) {
    assert_eq!(period_us(hz), expected);
}

// Debug builds assert on hz=0 to catch misconfiguration early.
#[cfg(debug_assertions)]
#[test]
#[should_panic(expected = "sample_rate_hz must be > 0")]
fn period_us_panics_on_zero_hz_in_debug() {
    let _ = period_us(0);
}

#[rstest]
#[case(80_000.0, " 80.0 kg")]
#[case(68_049.0, " 68.0 kg")]
#[case(1_960.0, "  2.0 kg")]
fn weight_is_shown_in_kilograms(#[case] grams: f32, #[case] text: &str) {
    assert_eq!(format_weight(grams), text);
}
