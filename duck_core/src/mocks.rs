//! Test and helper doubles for duck_core

use std::collections::VecDeque;
use std::time::Duration;

use duck_traits::{EnvSensor, GpsSource, Measurement, StackProbe};

/// Plays back a fixed script of results, then repeats the last entry.
pub struct ScriptedSensor {
    script: VecDeque<Result<Measurement, String>>,
    last: Result<Measurement, String>,
    reads: usize,
}

impl ScriptedSensor {
    pub fn new(script: Vec<Result<Measurement, String>>) -> Self {
        Self {
            script: script.into(),
            last: Err("empty script".to_owned()),
            reads: 0,
        }
    }

    /// A sensor that always returns `m`.
    pub fn constant(m: Measurement) -> Self {
        Self::new(vec![Ok(m)])
    }

    pub fn reads(&self) -> usize {
        self.reads
    }
}

impl EnvSensor for ScriptedSensor {
    fn read(
        &mut self,
        _timeout: Duration,
    ) -> Result<Measurement, Box<dyn std::error::Error + Send + Sync>> {
        self.reads += 1;
        if let Some(next) = self.script.pop_front() {
            self.last = next;
        }
        self.last
            .clone()
            .map_err(|e| Box::new(std::io::Error::other(e)) as _)
    }
}

/// GPS that always times out.
pub struct DeadGps;

impl GpsSource for DeadGps {
    fn read_fix(
        &mut self,
        _timeout: Duration,
    ) -> Result<Option<String>, Box<dyn std::error::Error + Send + Sync>> {
        Err(Box::new(std::io::Error::other("gps timeout")))
    }
}

/// Stack probe with a constant headroom.
pub struct FixedProbe(pub usize);

impl StackProbe for FixedProbe {
    fn stack_high_water_mark(&self) -> usize {
        self.0
    }
}
