//! Maps `Box<dyn Error>` from trait boundaries to typed `DuckError`.
//!
//! The traits in `duck_traits` return `Box<dyn Error + Send + Sync>`; with the
//! `hardware-errors` feature the simulator's `HwError` is downcast first.

use crate::error::DuckError;

/// Map a trait-boundary error to a typed `DuckError`.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> DuckError {
    #[cfg(feature = "hardware-errors")]
    {
        use duck_hardware::error::HwError;
        if let Some(hw) = e.downcast_ref::<HwError>() {
            return match hw {
                HwError::Timeout => DuckError::Timeout,
                other => DuckError::Hardware(other.to_string()),
            };
        }
    }

    // Fallback: string-based detection
    let s = e.to_string();
    if s.to_lowercase().contains("timeout") {
        DuckError::Timeout
    } else {
        DuckError::Hardware(s)
    }
}
