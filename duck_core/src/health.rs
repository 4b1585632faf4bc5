//! Advisory resource checks that annotate the shared status.

use std::sync::Arc;

use duck_traits::StackProbe;
use serde::Serialize;

use crate::status::{ErrorState, StatusKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StackHealth {
    pub task: String,
    /// Lowest remaining stack headroom observed, in bytes.
    pub high_water_mark: usize,
    pub min_watermark: usize,
    pub low: bool,
}

#[derive(Debug, Clone)]
pub struct HealthMonitor {
    state: Arc<ErrorState>,
}

impl HealthMonitor {
    pub fn new(state: Arc<ErrorState>) -> Self {
        Self { state }
    }

    /// Sample a task's headroom and raise `LowMemory` when it is below
    /// `min_watermark`. Never fails the caller.
    pub fn check_stack_health(
        &self,
        probe: &dyn StackProbe,
        task_name: &str,
        min_watermark: usize,
    ) -> StackHealth {
        let high_water_mark = probe.stack_high_water_mark();
        let low = high_water_mark < min_watermark;
        if low {
            let msg = format!("{task_name} stack low: {high_water_mark}B");
            self.state.report(StatusKind::LowMemory, Some(&msg));
        } else {
            tracing::trace!(task = task_name, high_water_mark, "stack ok");
        }
        StackHealth {
            task: task_name.to_owned(),
            high_water_mark,
            min_watermark,
            low,
        }
    }

    /// Raise `GpsNoFix` when a read returned no usable fix.
    pub fn check_gps_fix(&self, fix: Option<&str>) -> bool {
        match fix {
            Some(s) if !s.trim().is_empty() => true,
            _ => {
                self.state.report(StatusKind::GpsNoFix, Some("no GPS fix"));
                false
            }
        }
    }

    pub fn state(&self) -> &Arc<ErrorState> {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Probe(usize);
    impl StackProbe for Probe {
        fn stack_high_water_mark(&self) -> usize {
            self.0
        }
    }

    #[test]
    fn low_headroom_is_a_warning() {
        let state = Arc::new(ErrorState::new());
        let m = HealthMonitor::new(state.clone());
        let h = m.check_stack_health(&Probe(512), "ml", 1024);
        assert!(h.low);
        assert_eq!(state.current_status(), StatusKind::LowMemory);
        assert!(state.current_status().is_warning());
        assert_eq!(state.last_message(), "ml stack low: 512B");
    }

    #[test]
    fn threshold_itself_is_healthy() {
        let state = Arc::new(ErrorState::new());
        let m = HealthMonitor::new(state.clone());
        assert!(!m.check_stack_health(&Probe(1024), "ml", 1024).low);
        assert!(!state.is_error());
    }

    #[test]
    fn blank_fix_counts_as_no_fix() {
        let state = Arc::new(ErrorState::new());
        let m = HealthMonitor::new(state.clone());
        assert!(!m.check_gps_fix(Some("  ")));
        assert_eq!(state.current_status(), StatusKind::GpsNoFix);
        assert!(m.check_gps_fix(Some("$GPGGA,1")));
    }
}
