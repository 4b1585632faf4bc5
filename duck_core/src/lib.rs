#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Sensing core for a duck mesh node (hardware-agnostic).
//!
//! All peripheral access goes through `duck_traits::EnvSensor`,
//! `duck_traits::GpsSource` and `duck_traits::StackProbe`.
//!
//! ## Architecture
//!
//! - **Features**: per-channel rolling history, standardization, volatility
//!   and velocity (`features`, `history`)
//! - **Classifier**: data-driven decision-tree forest with majority vote
//!   (`forest`, `model`)
//! - **Retry/health**: bounded retries with an injectable clock and advisory
//!   stack/GPS checks writing to a shared `ErrorState` (`retry`, `health`,
//!   `status`)
//! - **Pipeline**: bounds validation, derivation and classification into a
//!   `DuckRecord` (`pipeline`, `record`), driven by `sampler` and `runner`

pub mod config;
pub mod conversions;
pub mod error;
pub mod features;
pub mod forest;
pub mod health;
pub mod history;
pub mod hw_error;
pub mod mocks;
pub mod model;
pub mod pipeline;
pub mod record;
pub mod retry;
pub mod runner;
pub mod sampler;
pub mod status;

use std::sync::Arc;

pub use config::{GpsCfg, HealthCfg, PipelineCfg, RetryCfg, SamplerCfg};
pub use error::{DuckError, Result, ValidationError};
pub use features::{
    Channel, ChannelFeatures, ChannelSpec, FeatureBasis, FeatureEngine, FeatureVector,
    PhysicalBound, Reading, Standardizer,
};
pub use forest::{ClassLabel, Forest, ModelError, Node, Tree};
pub use health::{HealthMonitor, StackHealth};
pub use history::History;
pub use pipeline::SensorPipeline;
pub use record::DuckRecord;
pub use retry::{RetryEvent, RetryPolicy};
pub use runner::{NodeRunner, RunSummary};
pub use sampler::Sampler;
pub use status::{ErrorState, StatusKind, StatusSnapshot};

/// Build a pipeline over the bundled forest.
pub fn builtin_pipeline(cfg: &PipelineCfg, state: Arc<ErrorState>) -> Result<SensorPipeline> {
    let engine = FeatureEngine::new(cfg.channels.clone(), cfg.history_window, cfg.basis);
    let forest = model::builtin_forest().map_err(DuckError::from)?;
    let pipeline = SensorPipeline::new(engine, forest, model::MODEL_CHANNELS.to_vec(), state)
        .map_err(DuckError::from)?;
    tracing::debug!(
        channels = cfg.channels.len(),
        window = cfg.history_window,
        basis = ?cfg.basis,
        "pipeline built"
    );
    Ok(pipeline)
}
