//! Conversions bridging `duck_config` types to `duck_core` types.

use std::time::Duration;

use crate::config::{GpsCfg, HealthCfg, PipelineCfg, RetryCfg, SamplerCfg};
use crate::error::DuckError;
use crate::features::{Channel, ChannelSpec, FeatureBasis, PhysicalBound, Standardizer};

impl From<duck_config::ChannelKey> for Channel {
    fn from(k: duck_config::ChannelKey) -> Self {
        match k {
            duck_config::ChannelKey::Temperature => Self::Temperature,
            duck_config::ChannelKey::Humidity => Self::Humidity,
            duck_config::ChannelKey::Pressure => Self::Pressure,
            duck_config::ChannelKey::Gas => Self::Gas,
        }
    }
}

impl From<duck_config::FeatureBasis> for FeatureBasis {
    fn from(b: duck_config::FeatureBasis) -> Self {
        match b {
            duck_config::FeatureBasis::Raw => Self::Raw,
            duck_config::FeatureBasis::Scaled => Self::Scaled,
        }
    }
}

impl From<duck_config::Bound> for PhysicalBound {
    fn from(b: duck_config::Bound) -> Self {
        Self {
            min: b.min,
            max: b.max,
        }
    }
}

impl From<duck_config::ChannelCalibration> for Standardizer {
    fn from(c: duck_config::ChannelCalibration) -> Self {
        Self {
            mean: c.mean,
            std: c.std,
        }
    }
}

impl TryFrom<&duck_config::Config> for PipelineCfg {
    type Error = DuckError;

    fn try_from(c: &duck_config::Config) -> Result<Self, Self::Error> {
        let channels = c
            .channels()
            .into_iter()
            .map(|key| {
                let bound = c
                    .bound(key)
                    .ok_or_else(|| DuckError::Config(format!("no bounds for {}", key.as_str())))?;
                let cal = c.channel_calibration(key).ok_or_else(|| {
                    DuckError::Config(format!("no calibration for {}", key.as_str()))
                })?;
                Ok(ChannelSpec {
                    channel: key.into(),
                    bound: bound.into(),
                    scaler: cal.into(),
                })
            })
            .collect::<Result<Vec<_>, DuckError>>()?;
        Ok(Self {
            channels,
            history_window: c.system.history_window,
            basis: c.feature_basis().into(),
        })
    }
}

impl From<&duck_config::SystemCfg> for RetryCfg {
    fn from(s: &duck_config::SystemCfg) -> Self {
        Self {
            max_attempts: s.max_retry_count,
            delay: Duration::from_millis(s.retry_delay_ms),
        }
    }
}

impl From<&duck_config::SystemCfg> for SamplerCfg {
    fn from(s: &duck_config::SystemCfg) -> Self {
        Self {
            interval: Duration::from_millis(s.read_interval_ms),
            sensor_timeout: Duration::from_millis(s.sensor_timeout_ms),
            ..Self::default()
        }
    }
}

impl From<&duck_config::SystemCfg> for GpsCfg {
    fn from(s: &duck_config::SystemCfg) -> Self {
        Self {
            timeout: Duration::from_millis(s.gps_timeout_ms),
            buffer_size: s.gps_buffer_size,
        }
    }
}

impl From<&duck_config::TaskCfg> for HealthCfg {
    fn from(t: &duck_config::TaskCfg) -> Self {
        Self {
            min_stack_watermark: t.min_stack_watermark,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn v6_defaults_map_to_four_raw_channels() {
        let cfg = duck_config::Config::default();
        let p = PipelineCfg::try_from(&cfg).unwrap();
        assert_eq!(p.channels.len(), 4);
        assert_eq!(p.basis, FeatureBasis::Raw);
        assert_eq!(p.history_window, 5);
        assert_eq!(p.channels[0].channel, Channel::Temperature);
        assert_eq!(p.channels[0].bound.max, 85.0);
    }

    #[test]
    fn retry_cfg_from_system() {
        let cfg = duck_config::Config::default();
        let r = RetryCfg::from(&cfg.system);
        assert_eq!(r.max_attempts, 3);
        assert_eq!(r.delay, Duration::from_millis(1000));
    }
}
