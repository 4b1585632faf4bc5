//! Hardware and time seams shared by the duck node crates.
//!
//! Drivers live behind these traits so the sensing pipeline can run against
//! real peripherals, the simulators in `duck_hardware`, or test doubles.

pub mod clock;

pub use clock::{Clock, MonotonicClock};

use std::time::Duration;

/// One raw sample from a BME-class environmental sensor.
///
/// Units follow the deployed hardware revision (pressure is hPa on older
/// boards and Pa on boards with a gas channel).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub temperature: f32,
    pub humidity: f32,
    pub pressure: f32,
    /// Gas resistance; `None` on boards without a gas channel.
    pub gas: Option<f32>,
}

pub trait EnvSensor {
    fn read(
        &mut self,
        timeout: Duration,
    ) -> Result<Measurement, Box<dyn std::error::Error + Send + Sync>>;
}

/// Source of NMEA-style position strings.
///
/// `Ok(None)` means the receiver answered but has no fix yet.
pub trait GpsSource {
    fn read_fix(
        &mut self,
        timeout: Duration,
    ) -> Result<Option<String>, Box<dyn std::error::Error + Send + Sync>>;
}

/// Reports the minimum remaining stack (bytes) a task has ever had.
pub trait StackProbe {
    fn stack_high_water_mark(&self) -> usize;
}

impl<S: EnvSensor + ?Sized> EnvSensor for Box<S> {
    fn read(
        &mut self,
        timeout: Duration,
    ) -> Result<Measurement, Box<dyn std::error::Error + Send + Sync>> {
        (**self).read(timeout)
    }
}

impl<G: GpsSource + ?Sized> GpsSource for Box<G> {
    fn read_fix(
        &mut self,
        timeout: Duration,
    ) -> Result<Option<String>, Box<dyn std::error::Error + Send + Sync>> {
        (**self).read_fix(timeout)
    }
}
