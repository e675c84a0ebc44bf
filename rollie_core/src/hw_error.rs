//! Maps `Box<dyn Error>` from trait boundaries to typed `RollieError`.
//!
//! The traits in `rollie_traits` use `Box<dyn Error + Send + Sync>` so device
//! crates stay independent; this module converts those to our typed error
//! enum, with an optional feature-gated path for `rollie_hardware::HwError`
//! downcasting.

use crate::error::RollieError;

/// Map a trait-boundary error to a typed `RollieError`.
///
/// Attempts to downcast known hardware error types first, then falls back
/// to string-based heuristics.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> RollieError {
    #[cfg(feature = "hardware-errors")]
    {
        if let Some(hw) = e.downcast_ref::<rollie_hardware::error::HwError>() {
            return match hw {
                rollie_hardware::error::HwError::Timeout => RollieError::Timeout,
                rollie_hardware::error::HwError::DataReadyTimeout => RollieError::Timeout,
                other => RollieError::HardwareFault(other.to_string()),
            };
        }
    }

    let s = e.to_string();
    if s.to_lowercase().contains("timeout") {
        RollieError::Timeout
    } else {
        RollieError::Hardware(s)
    }
}

/// Same as [`map_hw_error`] for the boxed form returned by collaborator traits.
#[inline]
pub fn map_boxed(e: &rollie_traits::BoxError) -> RollieError {
    map_hw_error(&**e)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_text_maps_to_timeout() {
        let e: rollie_traits::BoxError = "load cell timeout".into();
        assert!(matches!(map_boxed(&e), RollieError::Timeout));
    }

    #[test]
    fn other_text_maps_to_hardware() {
        let e: rollie_traits::BoxError = "bus fault".into();
        match map_boxed(&e) {
            RollieError::Hardware(msg) => assert_eq!(msg, "bus fault"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[cfg(feature = "hardware-errors")]
    #[test]
    fn typed_hw_errors_downcast() {
        use rollie_hardware::error::HwError;
        let e: rollie_traits::BoxError = Box::new(HwError::DataReadyTimeout);
        assert!(matches!(map_boxed(&e), RollieError::Timeout));
        let e: rollie_traits::BoxError = Box::new(HwError::LinkClosed);
        assert!(matches!(map_boxed(&e), RollieError::HardwareFault(_)));
    }
}
