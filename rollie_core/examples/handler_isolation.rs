//! Handler isolation check
//!
//! Registers a mount handler that panics next to one that counts, mounts a
//! subject, and exits non-zero unless the second handler still ran. Run it
//! against the shipped profile with `cargo run --release --example handler_isolation`.

use std::cell::Cell;
use std::process::ExitCode;
use std::rc::Rc;

use rollie_core::{Lifetime, ObserverCfg, ScaleObserver};

fn main() -> Result<ExitCode, eyre::Report> {
    let mut observer = ScaleObserver::new(ObserverCfg {
        tolerance: 1,
        ..ObserverCfg::default()
    })?;

    let hits = Rc::new(Cell::new(0u32));
    let counter = hits.clone();
    observer.on_mount("a-faulty-display", Lifetime::Unlimited, |_| {
        panic!("display unplugged")
    });
    observer.on_mount("b-counter", Lifetime::Unlimited, move |_| {
        counter.set(counter.get() + 1)
    });

    let transitions = observer.update(3000.0, None, false)?;
    println!(
        "mounted={} failed_handlers={} counted={}",
        transitions.mounted,
        transitions.failed_handlers,
        hits.get()
    );

    if transitions.mounted && transitions.failed_handlers == 1 && hits.get() == 1 {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
