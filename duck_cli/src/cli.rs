//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

/// Used when `--config` is not given and this file exists.
pub const DEFAULT_CONFIG: &str = "etc/duck_config.toml";

#[derive(Parser, Debug)]
#[command(name = "duck", version, about = "Duck node sensing pipeline")]
pub struct Cli {
    /// Path to config TOML; defaults to etc/duck_config.toml, then built-in defaults
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Optional calibration CSV overriding standardization constants (strict header)
    #[arg(long, value_name = "FILE")]
    pub calibration: Option<PathBuf>,

    /// Log and print results as JSON
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); overrides logging.level
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sample the simulated sensor and print one JSON record per accepted reading
    Run {
        /// Stop after this many readings (accepted or rejected)
        #[arg(long, value_name = "N")]
        cycles: Option<u64>,
        /// Override system.read_interval_ms
        #[arg(long, value_name = "MS")]
        interval_ms: Option<u64>,
        /// Make every N-th simulated sensor read fail (0 = never)
        #[arg(long, value_name = "N", default_value_t = 0)]
        fail_every: u32,
    },
    /// Evaluate the bundled model on a literal feature vector
    Classify {
        /// Comma-separated features: scaled T,H,P, volatility T,H,P, velocity T,H,P
        #[arg(long, value_delimiter = ',', required = true, allow_hyphen_values = true)]
        features: Vec<f32>,
    },
    /// Validate config and model, and run one reading through the pipeline
    SelfCheck,
    /// One sampling cycle, then print the node status
    Health {
        /// Make every N-th simulated sensor read fail (0 = never)
        #[arg(long, value_name = "N", default_value_t = 0)]
        fail_every: u32,
    },
}
