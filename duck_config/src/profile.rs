//! Per-board constants, one profile per deployed hardware revision.
//!
//! Standardization constants were produced offline together with the frozen
//! classifier for each board; they are data, not something derived at runtime.

use serde::Deserialize;

use crate::{Bound, ChannelCalibration, ChannelMap, FeatureBasis};

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum HardwareRevision {
    /// BME280-class board: temperature, humidity, pressure (hPa).
    V4,
    /// BME680 board with gas channel, pressure in Pa.
    V5,
    /// BME680 board, recalibrated on the wider field dataset.
    #[default]
    V6,
}

/// Fixed constants for one hardware revision.
#[derive(Debug, Clone, Copy)]
pub struct Profile {
    pub has_gas: bool,
    pub basis: FeatureBasis,
    pub bounds: ChannelMap<Bound>,
    pub calibration: ChannelMap<ChannelCalibration>,
}

const TEMPERATURE_BOUND: Bound = Bound {
    min: -40.0,
    max: 85.0,
};
const HUMIDITY_BOUND: Bound = Bound {
    min: 0.0,
    max: 100.0,
};
const PRESSURE_BOUND_HPA: Bound = Bound {
    min: 300.0,
    max: 1100.0,
};
const PRESSURE_BOUND_PA: Bound = Bound {
    min: 30_000.0,
    max: 110_000.0,
};
const GAS_BOUND: Bound = Bound {
    min: 0.0,
    max: 200_000.0,
};

const fn cal(mean: f32, std: f32) -> ChannelCalibration {
    ChannelCalibration { mean, std }
}

impl HardwareRevision {
    pub const fn profile(self) -> Profile {
        match self {
            Self::V4 => Profile {
                has_gas: false,
                basis: FeatureBasis::Scaled,
                bounds: ChannelMap {
                    temperature: Some(TEMPERATURE_BOUND),
                    humidity: Some(HUMIDITY_BOUND),
                    pressure: Some(PRESSURE_BOUND_HPA),
                    gas: None,
                },
                calibration: ChannelMap {
                    temperature: Some(cal(20.363_434, 1.530_466_5)),
                    humidity: Some(cal(26.952_677, 1.799_527_7)),
                    pressure: Some(cal(977.121_6, 0.204_191_96)),
                    gas: None,
                },
            },
            Self::V5 => Profile {
                has_gas: true,
                basis: FeatureBasis::Raw,
                bounds: ChannelMap {
                    temperature: Some(TEMPERATURE_BOUND),
                    humidity: Some(HUMIDITY_BOUND),
                    pressure: Some(PRESSURE_BOUND_PA),
                    gas: Some(GAS_BOUND),
                },
                calibration: ChannelMap {
                    temperature: Some(cal(29.439_186, 2.474_995_7)),
                    humidity: Some(cal(8.121_505, 0.788_300_1)),
                    pressure: Some(cal(97_206.945, 92.588_91)),
                    gas: Some(cal(68_812.22, 15_230.957)),
                },
            },
            Self::V6 => Profile {
                has_gas: true,
                basis: FeatureBasis::Raw,
                bounds: ChannelMap {
                    temperature: Some(TEMPERATURE_BOUND),
                    humidity: Some(HUMIDITY_BOUND),
                    pressure: Some(PRESSURE_BOUND_PA),
                    gas: Some(GAS_BOUND),
                },
                calibration: ChannelMap {
                    temperature: Some(cal(22.587_185, 9.119_503)),
                    humidity: Some(cal(20.218_387, 15.375_68)),
                    pressure: Some(cal(93_276.08, 18_385.143)),
                    gas: Some(cal(91_521.63, 31_677.996)),
                },
            },
        }
    }
}
