#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema, hardware-revision profiles and calibration parsing for the
//! duck sensing node.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - Each board revision ships a profile with physical bounds and
//!   standardization constants; TOML entries override the profile per channel.
//! - Calibration CSV loader enforces exact headers `channel,mean,std`.
use serde::Deserialize;

pub mod profile;

pub use profile::{HardwareRevision, Profile};

/// Physical channel names as they appear in TOML keys and calibration CSVs.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKey {
    Temperature,
    Humidity,
    Pressure,
    Gas,
}

impl ChannelKey {
    pub const ALL: [Self; 4] = [Self::Temperature, Self::Humidity, Self::Pressure, Self::Gas];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Humidity => "humidity",
            Self::Pressure => "pressure",
            Self::Gas => "gas",
        }
    }
}

/// Inclusive physical range for one channel.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct Bound {
    pub min: f32,
    pub max: f32,
}

/// Standardization constants: `scaled = (raw - mean) / std`.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct ChannelCalibration {
    pub mean: f32,
    pub std: f32,
}

/// Which value is pushed into the rolling history and differenced for velocity.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FeatureBasis {
    Raw,
    Scaled,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SystemCfg {
    /// Sensor sampling cadence in milliseconds
    pub read_interval_ms: u64,
    /// Max wait for one sensor conversion before the read counts as failed
    pub sensor_timeout_ms: u64,
    /// Max wait for a GPS sentence before the read counts as failed
    pub gps_timeout_ms: u64,
    /// Fixed pause between failed attempts of a retried operation
    pub retry_delay_ms: u64,
    /// Attempts per retried operation (first try included)
    pub max_retry_count: u8,
    /// Rolling history length per channel
    pub history_window: usize,
    /// GPS string buffer size in bytes (terminator included)
    pub gps_buffer_size: usize,
}

impl Default for SystemCfg {
    fn default() -> Self {
        Self {
            read_interval_ms: 10_000,
            sensor_timeout_ms: 1_000,
            gps_timeout_ms: 5_000,
            retry_delay_ms: 1_000,
            max_retry_count: 3,
            history_window: 5,
            gps_buffer_size: 100,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TaskCfg {
    pub ml_stack_size: usize,
    pub tx_stack_size: usize,
    /// Warn when a task's remaining stack drops below this many bytes
    pub min_stack_watermark: usize,
}

impl Default for TaskCfg {
    fn default() -> Self {
        Self {
            ml_stack_size: 32 * 1024,
            tx_stack_size: 16 * 1024,
            min_stack_watermark: 1024,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FeaturesCfg {
    /// Override the profile's history basis
    pub basis: Option<FeatureBasis>,
    /// Disable the gas channel on boards that have one
    pub use_gas: Option<bool>,
}

/// Per-channel overrides; absent channels fall back to the profile.
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct ChannelMap<T> {
    pub temperature: Option<T>,
    pub humidity: Option<T>,
    pub pressure: Option<T>,
    pub gas: Option<T>,
}

impl<T> Default for ChannelMap<T> {
    fn default() -> Self {
        Self {
            temperature: None,
            humidity: None,
            pressure: None,
            gas: None,
        }
    }
}

impl<T: Copy> ChannelMap<T> {
    pub fn get(&self, key: ChannelKey) -> Option<T> {
        match key {
            ChannelKey::Temperature => self.temperature,
            ChannelKey::Humidity => self.humidity,
            ChannelKey::Pressure => self.pressure,
            ChannelKey::Gas => self.gas,
        }
    }

    pub fn set(&mut self, key: ChannelKey, value: T) {
        match key {
            ChannelKey::Temperature => self.temperature = Some(value),
            ChannelKey::Humidity => self.humidity = Some(value),
            ChannelKey::Pressure => self.pressure = Some(value),
            ChannelKey::Gas => self.gas = Some(value),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Board revision whose constants seed bounds and calibration
    #[serde(default)]
    pub profile: HardwareRevision,
    #[serde(default)]
    pub system: SystemCfg,
    #[serde(default)]
    pub tasks: TaskCfg,
    #[serde(default)]
    pub features: FeaturesCfg,
    #[serde(default)]
    pub bounds: ChannelMap<Bound>,
    #[serde(default)]
    pub calibration: ChannelMap<ChannelCalibration>,
    #[serde(default)]
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    /// The profile for `self.profile`.
    pub fn profile(&self) -> Profile {
        self.profile.profile()
    }

    /// Channels sampled on this node, in feature order.
    pub fn channels(&self) -> Vec<ChannelKey> {
        let profile = self.profile();
        let gas = profile.has_gas && self.features.use_gas.unwrap_or(true);
        ChannelKey::ALL
            .into_iter()
            .filter(|k| *k != ChannelKey::Gas || gas)
            .collect()
    }

    pub fn feature_basis(&self) -> FeatureBasis {
        self.features.basis.unwrap_or(self.profile().basis)
    }

    /// Bound for `key`: TOML override first, profile second.
    pub fn bound(&self, key: ChannelKey) -> Option<Bound> {
        self.bounds.get(key).or_else(|| self.profile().bounds.get(key))
    }

    /// Standardization constants for `key`: TOML override first, profile second.
    pub fn channel_calibration(&self, key: ChannelKey) -> Option<ChannelCalibration> {
        self.calibration
            .get(key)
            .or_else(|| self.profile().calibration.get(key))
    }

    /// Replace calibration constants with rows loaded from CSV.
    pub fn apply_calibration(&mut self, rows: &[CalibrationRow]) {
        for row in rows {
            self.calibration.set(
                row.channel,
                ChannelCalibration {
                    mean: row.mean,
                    std: row.std,
                },
            );
        }
    }

    pub fn validate(&self) -> eyre::Result<()> {
        // System
        if self.system.max_retry_count == 0 {
            eyre::bail!("system.max_retry_count must be >= 1");
        }
        if self.system.history_window == 0 {
            eyre::bail!("system.history_window must be >= 1");
        }
        if self.system.history_window > 1024 {
            eyre::bail!("system.history_window is unreasonably large (>1024)");
        }
        if self.system.read_interval_ms == 0 {
            eyre::bail!("system.read_interval_ms must be >= 1");
        }
        if self.system.sensor_timeout_ms == 0 {
            eyre::bail!("system.sensor_timeout_ms must be >= 1");
        }
        if self.system.retry_delay_ms > 60 * 1000 {
            eyre::bail!("system.retry_delay_ms is unreasonably large (>60s)");
        }
        if self.system.gps_buffer_size < 2 {
            eyre::bail!("system.gps_buffer_size must be >= 2");
        }

        // Tasks
        if self.tasks.min_stack_watermark >= self.tasks.ml_stack_size {
            eyre::bail!("tasks.min_stack_watermark must be < tasks.ml_stack_size");
        }

        // Per-channel bounds and calibration
        for key in self.channels() {
            let name = key.as_str();
            let Some(b) = self.bound(key) else {
                eyre::bail!("bounds.{name} is missing");
            };
            if !(b.min.is_finite() && b.max.is_finite()) {
                eyre::bail!("bounds.{name} must be finite");
            }
            if b.min > b.max {
                eyre::bail!("bounds.{name}.min must be <= max");
            }
            let Some(c) = self.channel_calibration(key) else {
                eyre::bail!("calibration.{name} is missing");
            };
            if !c.mean.is_finite() {
                eyre::bail!("calibration.{name}.mean must be finite");
            }
            if !(c.std.is_finite() && c.std > 0.0) {
                eyre::bail!("calibration.{name}.std must be > 0");
            }
        }

        // Logging
        if let Some(r) = self.logging.rotation.as_deref()
            && !matches!(r, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }

        Ok(())
    }
}

/// Calibration CSV schema.
///
/// Expected headers:
/// channel,mean,std
///
/// Example:
/// channel,mean,std
/// temperature,22.587,9.1195
/// humidity,20.218,15.376
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct CalibrationRow {
    pub channel: ChannelKey,
    pub mean: f32,
    pub std: f32,
}

pub fn load_calibration_csv(path: &std::path::Path) -> eyre::Result<Vec<CalibrationRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open calibration CSV {:?}: {}", path, e))?;

    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let expected = ["channel", "mean", "std"];
    let actual: Vec<String> = headers.iter().map(ToString::to_string).collect();
    if actual != expected {
        eyre::bail!(
            "calibration CSV must have headers 'channel,mean,std', got: {}",
            actual.join(",")
        );
    }

    let mut rows: Vec<CalibrationRow> = Vec::new();
    for (idx, rec) in rdr.deserialize::<CalibrationRow>().enumerate() {
        match rec {
            Ok(row) => {
                if !(row.std.is_finite() && row.std > 0.0) {
                    eyre::bail!("invalid CSV row {}: std must be > 0", idx + 2);
                }
                if rows.iter().any(|r| r.channel == row.channel) {
                    eyre::bail!(
                        "invalid CSV row {}: duplicate channel '{}'",
                        idx + 2,
                        row.channel.as_str()
                    );
                }
                rows.push(row);
            }
            Err(e) => {
                eyre::bail!("invalid CSV row {}: {}", idx + 2, e);
            }
        }
    }
    if rows.is_empty() {
        eyre::bail!("calibration CSV {:?} has no rows", path);
    }
    Ok(rows)
}
