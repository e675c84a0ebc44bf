//! Threshold debouncer: raw weight in, debounced "subject present" flag out.

/// Which side of the threshold a sample fell on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Below,
    Above,
}

impl Side {
    #[inline]
    pub fn classify(sample_g: f32, threshold_g: f32) -> Self {
        // Equality stays below: only a strict crossing counts as present.
        if sample_g > threshold_g {
            Side::Above
        } else {
            Side::Below
        }
    }
}

/// Candidate side plus how many more agreeing samples it needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdState {
    pub candidate: Side,
    pub remaining: u32,
}

#[derive(Debug, Clone)]
pub struct ThresholdDebouncer {
    threshold_g: f32,
    tolerance: u32,
    state: ThresholdState,
    present: bool,
}

impl ThresholdDebouncer {
    pub fn new(threshold_g: f32, tolerance: u32) -> Self {
        Self {
            threshold_g,
            tolerance,
            state: ThresholdState {
                candidate: Side::Below,
                remaining: tolerance,
            },
            present: false,
        }
    }

    /// Feed one sample; returns the debounced presence flag.
    ///
    /// The flag only changes once `tolerance` consecutive samples agree on
    /// the same side. A tolerance of 0 or 1 flips on the first sample.
    pub fn apply(&mut self, sample_g: f32) -> bool {
        let side = Side::classify(sample_g, self.threshold_g);
        if side == self.state.candidate {
            self.state.remaining = self.state.remaining.saturating_sub(1);
        } else {
            self.state = ThresholdState {
                candidate: side,
                remaining: self.tolerance.saturating_sub(1),
            };
        }
        if self.state.remaining == 0 {
            self.present = self.state.candidate == Side::Above;
        }
        self.present
    }

    #[inline]
    pub fn is_present(&self) -> bool {
        self.present
    }

    #[inline]
    pub fn state(&self) -> ThresholdState {
        self.state
    }

    #[inline]
    pub fn tolerance(&self) -> u32 {
        self.tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn flips_on_exactly_the_tolerance_th_sample() {
        let mut d = ThresholdDebouncer::new(2000.0, 3);
        assert!(!d.apply(2500.0));
        assert!(!d.apply(2500.0));
        assert!(d.apply(2500.0));
        assert!(d.apply(2500.0));
    }

    #[test]
    fn single_dip_does_not_dismount() {
        let mut d = ThresholdDebouncer::new(2000.0, 3);
        for _ in 0..10 {
            d.apply(3000.0);
        }
        assert!(d.is_present());
        assert!(d.apply(100.0));
        assert!(d.apply(3000.0));
        assert!(d.apply(100.0));
        assert!(d.apply(100.0));
        assert!(!d.apply(100.0));
    }

    #[test]
    fn equality_classifies_below() {
        assert_eq!(Side::classify(2000.0, 2000.0), Side::Below);
        let mut d = ThresholdDebouncer::new(2000.0, 1);
        assert!(!d.apply(2000.0));
        assert!(d.apply(2000.1));
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    fn degenerate_tolerance_is_undebounced(#[case] tolerance: u32) {
        let mut d = ThresholdDebouncer::new(10.0, tolerance);
        assert!(d.apply(11.0));
        assert!(!d.apply(9.0));
        assert!(d.apply(11.0));
        assert_eq!(d.state().remaining, 0);
    }

    #[test]
    fn remaining_never_exceeds_tolerance() {
        let mut d = ThresholdDebouncer::new(50.0, 4);
        for (i, w) in [60.0, 40.0, 60.0, 60.0, 60.0, 60.0, 60.0, 10.0]
            .into_iter()
            .enumerate()
        {
            d.apply(w);
            assert!(d.state().remaining <= d.tolerance(), "step {i}");
        }
    }
}
