//! Rolling feature derivation: standardization, volatility and velocity.
//!
//! The engine is owned by a single inference task. A `derive` call mutates
//! histories and the previous-sample tracker in several steps and must not
//! be interleaved with another.

use serde::Serialize;
use std::fmt;

use crate::history::History;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Temperature,
    Humidity,
    Pressure,
    Gas,
}

impl Channel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Humidity => "humidity",
            Self::Pressure => "pressure",
            Self::Gas => "gas",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One captured sample, stamped with milliseconds on the node's monotonic clock.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Reading {
    pub timestamp_ms: u64,
    pub temperature: f32,
    pub humidity: f32,
    pub pressure: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas: Option<f32>,
}

impl Reading {
    pub fn from_measurement(m: duck_traits::Measurement, timestamp_ms: u64) -> Self {
        Self {
            timestamp_ms,
            temperature: m.temperature,
            humidity: m.humidity,
            pressure: m.pressure,
            gas: m.gas,
        }
    }

    pub fn value(&self, channel: Channel) -> Option<f32> {
        match channel {
            Channel::Temperature => Some(self.temperature),
            Channel::Humidity => Some(self.humidity),
            Channel::Pressure => Some(self.pressure),
            Channel::Gas => self.gas,
        }
    }
}

/// `scaled = (raw - mean) / std` with deployment calibration constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Standardizer {
    pub mean: f32,
    pub std: f32,
}

impl Standardizer {
    #[inline]
    pub fn scale(&self, raw: f32) -> f32 {
        (raw - self.mean) / self.std
    }
}

/// Inclusive physical range for a channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicalBound {
    pub min: f32,
    pub max: f32,
}

impl PhysicalBound {
    /// NaN is never contained.
    #[inline]
    pub fn contains(&self, v: f32) -> bool {
        v >= self.min && v <= self.max
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelSpec {
    pub channel: Channel,
    pub bound: PhysicalBound,
    pub scaler: Standardizer,
}

/// Value tracked by histories and velocity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeatureBasis {
    /// Raw sensor units (BME680 boards).
    #[default]
    Raw,
    /// Standardized values (older three-channel boards).
    Scaled,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChannelFeatures {
    pub channel: Channel,
    pub raw: f32,
    pub scaled: f32,
    pub volatility: f32,
    /// Units per hour of the feature basis; 0 without a previous sample.
    pub velocity: f32,
}

/// Snapshot produced per inference call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    pub timestamp_ms: u64,
    pub channels: Vec<ChannelFeatures>,
}

impl FeatureVector {
    pub fn get(&self, channel: Channel) -> Option<&ChannelFeatures> {
        self.channels.iter().find(|c| c.channel == channel)
    }

    /// Flatten into classifier input: all scaled values, then all
    /// volatilities, then all velocities, in `order`. Channels this vector
    /// lacks become NaN.
    pub fn model_input(&self, order: &[Channel]) -> Vec<f32> {
        let found: Vec<Option<&ChannelFeatures>> = order.iter().map(|&ch| self.get(ch)).collect();
        let mut out = Vec::with_capacity(order.len() * 3);
        out.extend(found.iter().map(|c| c.map_or(f32::NAN, |c| c.scaled)));
        out.extend(found.iter().map(|c| c.map_or(f32::NAN, |c| c.volatility)));
        out.extend(found.iter().map(|c| c.map_or(f32::NAN, |c| c.velocity)));
        out
    }
}

#[derive(Debug, Clone)]
struct Previous {
    timestamp_ms: u64,
    values: Vec<f32>,
}

#[derive(Debug, Clone)]
pub struct FeatureEngine {
    specs: Vec<ChannelSpec>,
    histories: Vec<History>,
    basis: FeatureBasis,
    previous: Option<Previous>,
}

impl FeatureEngine {
    pub fn new(specs: Vec<ChannelSpec>, window: usize, basis: FeatureBasis) -> Self {
        let histories = specs.iter().map(|_| History::new(window)).collect();
        Self {
            specs,
            histories,
            basis,
            previous: None,
        }
    }

    pub fn specs(&self) -> &[ChannelSpec] {
        &self.specs
    }

    pub fn basis(&self) -> FeatureBasis {
        self.basis
    }

    pub fn history(&self, channel: Channel) -> Option<&History> {
        self.specs
            .iter()
            .position(|s| s.channel == channel)
            .map(|i| &self.histories[i])
    }

    /// Forget histories and the previous sample, as after a reboot.
    pub fn reset(&mut self) {
        for h in &mut self.histories {
            h.clear();
        }
        self.previous = None;
    }

    /// Push the basis value of every channel into its history.
    pub fn update(&mut self, reading: &Reading) {
        let values = self.basis_values(reading);
        for (h, v) in self.histories.iter_mut().zip(values) {
            h.push(v);
        }
    }

    /// Update histories from `reading` and derive its feature vector.
    ///
    /// Missing channel values propagate as NaN; callers validate first.
    pub fn derive(&mut self, reading: &Reading) -> FeatureVector {
        let values = self.basis_values(reading);
        for (h, &v) in self.histories.iter_mut().zip(&values) {
            h.push(v);
        }

        let elapsed_hours = self.previous.as_ref().and_then(|p| {
            let dt_ms = reading.timestamp_ms.saturating_sub(p.timestamp_ms);
            (dt_ms > 0).then(|| dt_ms as f64 / MILLIS_PER_HOUR)
        });

        let channels = self
            .specs
            .iter()
            .zip(&self.histories)
            .enumerate()
            .map(|(i, (spec, history))| {
                let raw = reading.value(spec.channel).unwrap_or(f32::NAN);
                let velocity = match (&self.previous, elapsed_hours) {
                    (Some(p), Some(hours)) => {
                        ((f64::from(values[i]) - f64::from(p.values[i])) / hours) as f32
                    }
                    _ => 0.0,
                };
                ChannelFeatures {
                    channel: spec.channel,
                    raw,
                    scaled: spec.scaler.scale(raw),
                    volatility: history.volatility(),
                    velocity,
                }
            })
            .collect();

        self.previous = Some(Previous {
            timestamp_ms: reading.timestamp_ms,
            values,
        });

        FeatureVector {
            timestamp_ms: reading.timestamp_ms,
            channels,
        }
    }

    fn basis_values(&self, reading: &Reading) -> Vec<f32> {
        self.specs
            .iter()
            .map(|spec| {
                let raw = reading.value(spec.channel).unwrap_or(f32::NAN);
                match self.basis {
                    FeatureBasis::Raw => raw,
                    FeatureBasis::Scaled => spec.scaler.scale(raw),
                }
            })
            .collect()
    }
}
