//! Runtime configuration types for the sensing core.
//!
//! These are separate from the TOML-deserialized config in `duck_config`;
//! see `conversions` for the mapping.

use std::time::Duration;

use crate::features::{ChannelSpec, FeatureBasis};

/// Channels, window and basis for the feature engine.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineCfg {
    /// Active channels in feature order, with bounds and standardization.
    pub channels: Vec<ChannelSpec>,
    pub history_window: usize,
    pub basis: FeatureBasis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryCfg {
    pub max_attempts: u8,
    /// Fixed wait between failed attempts.
    pub delay: Duration,
}

impl Default for RetryCfg {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_millis(1000),
        }
    }
}

/// Sensor sampling cadence and timeouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerCfg {
    pub interval: Duration,
    pub sensor_timeout: Duration,
    /// Bounded queue between sampler and inference; readings are dropped
    /// with `QueueFull` when it is full.
    pub queue_depth: usize,
}

impl Default for SamplerCfg {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(10_000),
            sensor_timeout: Duration::from_millis(1000),
            queue_depth: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpsCfg {
    pub timeout: Duration,
    /// Record GPS strings keep at most `buffer_size - 1` characters.
    pub buffer_size: usize,
}

impl Default for GpsCfg {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(5000),
            buffer_size: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthCfg {
    /// Minimum stack headroom in bytes before `LowMemory` is raised.
    pub min_stack_watermark: usize,
}

impl Default for HealthCfg {
    fn default() -> Self {
        Self {
            min_stack_watermark: 1024,
        }
    }
}
