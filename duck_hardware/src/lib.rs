//! Simulated peripherals for running a duck node without hardware.
pub mod error;

use std::time::Duration;

use duck_traits::{EnvSensor, GpsSource, Measurement, StackProbe};

use crate::error::HwError;

/// Deterministic environmental sensor.
///
/// Each read walks a slow triangle wave around `base` so histories and
/// velocities see movement. Failures can be injected every `fail_every`
/// reads to exercise retries.
#[derive(Debug, Clone)]
pub struct SimulatedEnvSensor {
    base: Measurement,
    step: f32,
    period: u32,
    tick: u32,
    fail_every: Option<u32>,
}

impl SimulatedEnvSensor {
    pub fn new(base: Measurement) -> Self {
        Self {
            base,
            step: 0.05,
            period: 20,
            tick: 0,
            fail_every: None,
        }
    }

    /// Relative drift per read as a fraction of each base value.
    pub fn with_step(mut self, step: f32) -> Self {
        self.step = step;
        self
    }

    /// Fail every `n`-th read with a timeout (`n == 0` disables).
    pub fn with_failures(mut self, n: u32) -> Self {
        self.fail_every = (n > 0).then_some(n);
        self
    }

    pub fn reads(&self) -> u32 {
        self.tick
    }

    fn wave(&self) -> f32 {
        let half = self.period / 2;
        let pos = self.tick % self.period;
        let tri = if pos <= half { pos } else { self.period - pos };
        // -1.0 ..= 1.0
        (tri as f32 / half.max(1) as f32) * 2.0 - 1.0
    }
}

impl EnvSensor for SimulatedEnvSensor {
    fn read(
        &mut self,
        _timeout: Duration,
    ) -> Result<Measurement, Box<dyn std::error::Error + Send + Sync>> {
        self.tick = self.tick.wrapping_add(1);
        if let Some(n) = self.fail_every {
            if self.tick % n == 0 {
                tracing::debug!(tick = self.tick, "simulated sensor timeout");
                return Err(Box::new(HwError::Timeout));
            }
        }
        let k = 1.0 + self.step * self.wave();
        Ok(Measurement {
            temperature: self.base.temperature * k,
            humidity: self.base.humidity * k,
            pressure: self.base.pressure * (1.0 + (k - 1.0) * 0.01),
            gas: self.base.gas.map(|g| g * k),
        })
    }
}

/// GPS receiver that has no fix for the first `warmup` reads.
#[derive(Debug, Clone)]
pub struct SimulatedGps {
    warmup: u32,
    reads: u32,
    sentence: String,
}

impl SimulatedGps {
    pub fn new(warmup: u32) -> Self {
        Self {
            warmup,
            reads: 0,
            sentence: "$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47"
                .to_owned(),
        }
    }

    pub fn with_sentence(mut self, sentence: impl Into<String>) -> Self {
        self.sentence = sentence.into();
        self
    }
}

impl GpsSource for SimulatedGps {
    fn read_fix(
        &mut self,
        _timeout: Duration,
    ) -> Result<Option<String>, Box<dyn std::error::Error + Send + Sync>> {
        self.reads = self.reads.saturating_add(1);
        if self.reads <= self.warmup {
            return Ok(None);
        }
        Ok(Some(self.sentence.clone()))
    }
}

/// Stack probe reporting a constant headroom.
#[derive(Debug, Clone, Copy)]
pub struct FixedStackProbe(pub usize);

impl StackProbe for FixedStackProbe {
    fn stack_high_water_mark(&self) -> usize {
        self.0
    }
}
