//! Rolling stability window over recent samples.

use std::collections::VecDeque;

/// Fixed-size FIFO of the last `history_size` samples.
///
/// The window only reports stable once it is full and every sample lies
/// within `deviation_g` of the window mean.
#[derive(Debug, Clone)]
pub struct StabilityWindow {
    samples: VecDeque<f32>,
    history_size: usize,
    deviation_g: f32,
}

impl StabilityWindow {
    pub fn new(history_size: usize, deviation_g: f32) -> Self {
        let history_size = history_size.max(1);
        Self {
            samples: VecDeque::with_capacity(history_size + 1),
            history_size,
            deviation_g,
        }
    }

    /// Append a sample, evict the oldest when over capacity, and report
    /// whether the window is full and stable.
    pub fn push(&mut self, sample_g: f32) -> bool {
        self.samples.push_back(sample_g);
        while self.samples.len() > self.history_size {
            self.samples.pop_front();
        }
        debug_assert!(self.samples.len() <= self.history_size);
        self.is_stable()
    }

    pub fn is_stable(&self) -> bool {
        if self.samples.len() < self.history_size {
            return false;
        }
        let Some(mean) = self.mean() else {
            return false;
        };
        self.samples
            .iter()
            .all(|&x| (f64::from(x) - mean).abs() <= f64::from(self.deviation_g))
    }

    /// Arithmetic mean of the current window, `None` when empty.
    pub fn mean(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        // Sum in f64 so large gram values do not lose the deviation band.
        let sum: f64 = self.samples.iter().map(|&x| f64::from(x)).sum();
        Some(sum / self.samples.len() as f64)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.samples.len() == self.history_size
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.history_size
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn samples(&self) -> impl Iterator<Item = f32> + '_ {
        self.samples.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_partial_windows_are_unstable() {
        let mut w = StabilityWindow::new(3, 1000.0);
        assert!(!w.is_stable());
        assert!(!w.push(10.0));
        assert!(!w.push(10.0));
        assert!(w.push(10.0));
    }

    #[test]
    fn outlier_breaks_then_ages_out() {
        let mut w = StabilityWindow::new(5, 100.0);
        for _ in 0..4 {
            assert!(!w.push(1000.0));
        }
        assert!(w.push(1000.0));

        // [1000, 1000, 1000, 1000, 5000]
        assert!(!w.push(5000.0));
        // The outlier stays in the window for four more pushes.
        for _ in 0..4 {
            assert!(!w.push(1000.0));
        }
        assert_eq!(w.samples().collect::<Vec<_>>()[0], 5000.0);
        assert!(w.push(1000.0));
    }

    #[test]
    fn deviation_bound_is_inclusive() {
        let mut w = StabilityWindow::new(2, 50.0);
        w.push(0.0);
        // mean 50, both samples exactly 50 away
        assert!(w.push(100.0));
        assert!(!w.push(201.0));
    }

    #[test]
    fn zero_deviation_requires_identical_samples() {
        let mut w = StabilityWindow::new(3, 0.0);
        w.push(7.0);
        w.push(7.0);
        assert!(w.push(7.0));
        assert!(!w.push(7.5));
    }

    #[test]
    fn never_exceeds_history_size() {
        let mut w = StabilityWindow::new(4, 1.0);
        for i in 0..20 {
            w.push(i as f32);
            assert!(w.len() <= w.capacity());
        }
        assert!(w.is_full());
        w.clear();
        assert!(w.is_empty());
        assert_eq!(w.mean(), None);
    }
}
