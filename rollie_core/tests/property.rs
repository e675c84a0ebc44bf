use std::cell::Cell;
use std::rc::Rc;

use proptest::prelude::*;
use rollie_core::{Lifetime, ObserverCfg, ScaleObserver, StabilityWindow, ThresholdDebouncer};

proptest! {
    #[test]
    fn window_never_exceeds_history(
        history in 1usize..16,
        samples in proptest::collection::vec(-1.0e6f32..1.0e6, 0..64),
    ) {
        let mut w = StabilityWindow::new(history, 50.0);
        for s in samples {
            let stable = w.push(s);
            prop_assert!(w.len() <= history);
            // Stable implies full.
            prop_assert!(!stable || w.is_full());
        }
    }

    #[test]
    fn constant_stream_is_stable_once_full(
        history in 1usize..16,
        value in -1.0e6f32..1.0e6,
    ) {
        let mut w = StabilityWindow::new(history, 0.0);
        for i in 1..=history {
            prop_assert_eq!(w.push(value), i == history);
        }
    }

    #[test]
    fn presence_only_flips_after_tolerance_agreeing_samples(
        tolerance in 1u32..8,
        samples in proptest::collection::vec(prop_oneof![Just(0.0f32), Just(5000.0f32)], 0..80),
    ) {
        let mut d = ThresholdDebouncer::new(2000.0, tolerance);
        let mut prev = false;
        let mut run: u32 = 0;
        let mut last_side = None;
        for s in samples {
            let above = s > 2000.0;
            if last_side == Some(above) {
                run += 1;
            } else {
                run = 1;
                last_side = Some(above);
            }
            let now = d.apply(s);
            if now != prev {
                prop_assert_eq!(now, above);
                prop_assert!(run >= tolerance);
            }
            prev = now;
        }
    }

    #[test]
    fn finite_lifetime_bounds_invocations(
        budget in 0u32..6,
        visits in 0usize..12,
    ) {
        let mut obs = ScaleObserver::new(ObserverCfg { tolerance: 1, ..ObserverCfg::default() }).unwrap();
        let hits = Rc::new(Cell::new(0u32));
        let h = hits.clone();
        obs.on_mount("m", Lifetime::Times(budget), move |_| h.set(h.get() + 1));
        for _ in 0..visits {
            obs.update(3000.0, None, false).unwrap();
            obs.update(0.0, None, false).unwrap();
        }
        prop_assert_eq!(hits.get(), budget.min(visits as u32));
    }

    #[test]
    fn weighings_never_outnumber_stabilizations(
        samples in proptest::collection::vec(
            (prop_oneof![Just(0.0f32), Just(80_000.0f32), Just(80_050.0f32), Just(95_000.0f32)], any::<bool>()),
            0..120,
        ),
    ) {
        let mut obs = ScaleObserver::new(ObserverCfg::default()).unwrap();
        let weighed = Rc::new(Cell::new(0usize));
        let w = weighed.clone();
        obs.on_successful_weighing("w", Lifetime::Unlimited, move |_, _| w.set(w.get() + 1));
        let mut stabilizations = 0usize;
        for (weight, nfc) in samples {
            let tag = nfc.then(|| rollie_traits::TagRecord::new(10_000.0));
            let t = obs.update(weight, tag, nfc).unwrap();
            if t.stabilized {
                stabilizations += 1;
            }
            if t.weighed {
                prop_assert!(t.stabilized);
                prop_assert!(obs.state().person_on_scale);
                prop_assert!(obs.state().nfc_present);
            }
        }
        prop_assert!(weighed.get() <= stabilizations);
    }
}
