use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::thread;
use std::time::Duration;

use rollie_hardware::error::HwError;
use rollie_hardware::util::{wait_until, wait_until_ready};

#[test]
fn ready_line_going_low_in_time_succeeds() {
    let ready = Arc::new(AtomicBool::new(false));
    let flip = ready.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_millis(3));
        flip.store(true, Ordering::Relaxed);
    });

    let res = wait_until_ready(
        || ready.load(Ordering::Relaxed),
        Duration::from_millis(500),
        Duration::from_micros(200),
    );
    assert!(res.is_ok(), "expected success, got {res:?}");
}

#[test]
fn expired_wait_is_a_data_ready_timeout() {
    let err = wait_until_ready(|| false, Duration::from_millis(5), Duration::from_micros(200))
        .expect_err("expected timeout error");
    assert!(matches!(err, HwError::DataReadyTimeout), "unexpected error: {err:?}");
}

#[test]
fn condition_is_checked_even_with_zero_timeout() {
    let calls = AtomicU32::new(0);
    assert!(wait_until(
        || {
            calls.fetch_add(1, Ordering::Relaxed);
            true
        },
        Duration::ZERO,
        Duration::from_millis(1),
    ));
    assert_eq!(calls.load(Ordering::Relaxed), 1);
    assert!(!wait_until(|| false, Duration::ZERO, Duration::from_millis(1)));
}
