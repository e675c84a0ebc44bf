//! Bounded polling helpers shared by the device drivers.

use std::time::{Duration, Instant};

use crate::error::{HwError, Result};

/// Check `cond` every `poll_interval` until it holds or `timeout` has
/// elapsed. Returns whether it held. `cond` is always checked at least once.
pub fn wait_until(mut cond: impl FnMut() -> bool, timeout: Duration, poll_interval: Duration) -> bool {
    let start = Instant::now();
    loop {
        if cond() {
            return true;
        }
        if start.elapsed() >= timeout {
            return false;
        }
        std::thread::sleep(poll_interval);
    }
}

/// [`wait_until`] for a conversion-ready line; expiry is `DataReadyTimeout`.
pub fn wait_until_ready(
    ready: impl FnMut() -> bool,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<()> {
    if wait_until(ready, timeout, poll_interval) {
        Ok(())
    } else {
        Err(HwError::DataReadyTimeout)
    }
}
