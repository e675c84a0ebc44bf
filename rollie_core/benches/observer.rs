use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rollie_core::{Lifetime, ObserverCfg, ScaleObserver, StabilityWindow};
use rollie_traits::TagRecord;

fn bench_update(c: &mut Criterion) {
    c.bench_function("observer_update_visit", |b| {
        b.iter(|| {
            let mut obs = ScaleObserver::new(ObserverCfg::default()).unwrap();
            obs.on_mount("m", Lifetime::Unlimited, |_| {});
            obs.on_dismount("d", Lifetime::Unlimited, |_| {});
            obs.on_successful_weighing("w", Lifetime::Unlimited, |ev, _| {
                black_box(ev.net_weight_g());
            });
            for i in 0..100u32 {
                let on = (10..80).contains(&i);
                let weight = if on { 80_000.0 } else { 0.0 };
                let tag = on.then(|| TagRecord::new(12_000.0));
                black_box(obs.update(black_box(weight), tag, on).unwrap());
            }
        });
    });
}

fn bench_window(c: &mut Criterion) {
    let mut w = StabilityWindow::new(50, 100.0);
    let mut x = 0.0f32;
    c.bench_function("stability_push_50", |b| {
        b.iter(|| {
            x = (x + 13.0) % 150.0;
            black_box(w.push(black_box(80_000.0 + x)))
        });
    });
}

criterion_group!(benches, bench_update, bench_window);
criterion_main!(benches);
