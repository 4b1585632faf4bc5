//! Inference-task loop: readings in, records out.
//!
//! A rejected reading or an exhausted GPS retry only degrades the current
//! cycle. Nothing here aborts the node.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossbeam_channel as xch;
use duck_traits::{GpsSource, StackProbe};
use serde::Serialize;

use crate::config::{GpsCfg, HealthCfg};
use crate::error::Result;
use crate::features::Reading;
use crate::health::HealthMonitor;
use crate::hw_error::map_hw_error;
use crate::pipeline::SensorPipeline;
use crate::record::DuckRecord;
use crate::retry::RetryPolicy;
use crate::status::StatusKind;

/// Task name used in stack-health reports.
pub const INFERENCE_TASK: &str = "ml";

const RECV_POLL: Duration = Duration::from_millis(100);

/// Counters for one `run` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub accepted: u64,
    pub rejected: u64,
}

pub struct NodeRunner {
    pipeline: SensorPipeline,
    retry: RetryPolicy,
    health: HealthMonitor,
    health_cfg: HealthCfg,
    probe: Box<dyn StackProbe + Send>,
    gps: Option<Box<dyn GpsSource + Send>>,
    gps_cfg: GpsCfg,
}

impl NodeRunner {
    pub fn new(
        pipeline: SensorPipeline,
        retry: RetryPolicy,
        health_cfg: HealthCfg,
        probe: Box<dyn StackProbe + Send>,
    ) -> Self {
        let health = HealthMonitor::new(pipeline.state().clone());
        Self {
            pipeline,
            retry,
            health,
            health_cfg,
            probe,
            gps: None,
            gps_cfg: GpsCfg::default(),
        }
    }

    pub fn with_gps(mut self, gps: Box<dyn GpsSource + Send>, cfg: GpsCfg) -> Self {
        self.gps = Some(gps);
        self.gps_cfg = cfg;
        self
    }

    pub fn pipeline(&self) -> &SensorPipeline {
        &self.pipeline
    }

    /// One inference cycle. `None` when the reading was rejected.
    pub fn cycle(&mut self, reading: &Reading) -> Option<DuckRecord> {
        self.health.check_stack_health(
            self.probe.as_ref(),
            INFERENCE_TASK,
            self.health_cfg.min_stack_watermark,
        );

        let mut record = self.pipeline.process(reading).ok()?;

        if let Some(gps) = self.gps.as_mut() {
            let timeout = self.gps_cfg.timeout;
            let fix = self
                .retry
                .retry("gps read", StatusKind::GpsTimeout, || {
                    gps.read_fix(timeout).map_err(|e| map_hw_error(e.as_ref()))
                })
                .ok()
                .flatten();
            self.health.check_gps_fix(fix.as_deref());
            record.set_gps(fix.as_deref(), self.gps_cfg.buffer_size);
        }
        Some(record)
    }

    /// Consume readings until `shutdown` is set, the channel closes or
    /// `max_cycles` readings were processed. Every accepted record goes to
    /// `sink`; a sink error stops the loop.
    pub fn run(
        &mut self,
        rx: &xch::Receiver<Reading>,
        shutdown: &AtomicBool,
        max_cycles: Option<u64>,
        mut sink: impl FnMut(&DuckRecord) -> Result<()>,
    ) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        while !shutdown.load(Ordering::Relaxed) {
            if max_cycles.is_some_and(|n| summary.accepted + summary.rejected >= n) {
                break;
            }
            let reading = match rx.recv_timeout(RECV_POLL) {
                Ok(r) => r,
                Err(xch::RecvTimeoutError::Timeout) => continue,
                Err(xch::RecvTimeoutError::Disconnected) => {
                    tracing::debug!("reading channel closed");
                    break;
                }
            };
            match self.cycle(&reading) {
                Some(record) => {
                    summary.accepted += 1;
                    sink(&record)?;
                }
                None => summary.rejected += 1,
            }
        }
        tracing::info!(
            accepted = summary.accepted,
            rejected = summary.rejected,
            "node runner stopped"
        );
        Ok(summary)
    }
}
