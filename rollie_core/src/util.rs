//! Loop pacing and display helpers.

const MICROS_PER_SEC: u64 = 1_000_000;

/// Cycle period in microseconds for a polling rate in Hz, never below 1 µs.
/// `hz = 0` is a configuration bug; release builds treat it as 1 Hz.
#[inline]
pub fn period_us(hz: u32) -> u64 {
    debug_assert!(hz > 0, "sample_rate_hz must be > 0");
    (MICROS_PER_SEC / u64::from(hz.max(1))).max(1)
}

/// Render a gram reading the way the station display shows it:
/// kilograms, one decimal, right-aligned in five columns.
pub fn format_weight(grams: f32) -> String {
    format!("{:>5.1} kg", grams / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::format_weight;

    #[test]
    fn formats_kilograms_with_one_decimal() {
        assert_eq!(format_weight(72_400.0), " 72.4 kg");
        assert_eq!(format_weight(123_400.0), "123.4 kg");
        assert_eq!(format_weight(0.0), "  0.0 kg");
        assert_eq!(format_weight(-500.0), " -0.5 kg");
    }
}
