use thiserror::Error;

use crate::features::Channel;
use crate::forest::ModelError;
use crate::status::StatusKind;

/// A reading rejected before it reaches the feature engine.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{channel} reading {value} outside physical bounds [{min}, {max}]")]
    OutOfBounds {
        channel: Channel,
        value: f32,
        min: f32,
        max: f32,
    },
    #[error("{channel} reading missing")]
    Missing { channel: Channel },
}

impl ValidationError {
    pub fn channel(&self) -> Channel {
        match self {
            Self::OutOfBounds { channel, .. } | Self::Missing { channel } => *channel,
        }
    }
}

#[derive(Debug, Error, Clone)]
pub enum DuckError {
    #[error("invalid reading: {0}")]
    Validation(#[from] ValidationError),
    #[error("{operation} failed after {attempts} attempts ({kind}): {last_error}")]
    RetryExhausted {
        operation: String,
        kind: StatusKind,
        attempts: u8,
        last_error: String,
    },
    #[error("configuration error: {0}")]
    Config(String),
    #[error("model error: {0}")]
    Model(#[from] ModelError),
    #[error("hardware error: {0}")]
    Hardware(String),
    #[error("timeout waiting for sensor")]
    Timeout,
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
