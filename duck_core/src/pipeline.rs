//! Validation, feature derivation and classification for one node.

use std::sync::Arc;

use crate::error::ValidationError;
use crate::features::{Channel, FeatureEngine, FeatureVector, Reading};
use crate::forest::{ClassLabel, Forest, ModelError};
use crate::record::DuckRecord;
use crate::status::{ErrorState, StatusKind};

#[derive(Debug)]
pub struct SensorPipeline {
    engine: FeatureEngine,
    forest: Forest,
    model_channels: Vec<Channel>,
    state: Arc<ErrorState>,
}

impl SensorPipeline {
    /// `model_channels` fixes the classifier input order; the forest must
    /// take exactly three features per channel and every channel must be
    /// sampled by `engine`.
    pub fn new(
        engine: FeatureEngine,
        forest: Forest,
        model_channels: Vec<Channel>,
        state: Arc<ErrorState>,
    ) -> Result<Self, ModelError> {
        let got = model_channels.len() * 3;
        if forest.n_features() != got {
            return Err(ModelError::InputWidth {
                expected: forest.n_features(),
                got,
            });
        }
        if let Some(&channel) = model_channels
            .iter()
            .find(|c| !engine.specs().iter().any(|s| s.channel == **c))
        {
            return Err(ModelError::UnsampledChannel { channel });
        }
        Ok(Self {
            engine,
            forest,
            model_channels,
            state,
        })
    }

    pub fn engine(&self) -> &FeatureEngine {
        &self.engine
    }

    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    pub fn model_channels(&self) -> &[Channel] {
        &self.model_channels
    }

    pub fn state(&self) -> &Arc<ErrorState> {
        &self.state
    }

    /// Check every configured channel against its inclusive physical bound.
    pub fn validate(&self, reading: &Reading) -> Result<(), ValidationError> {
        for spec in self.engine.specs() {
            let channel = spec.channel;
            let value = reading
                .value(channel)
                .ok_or(ValidationError::Missing { channel })?;
            if !spec.bound.contains(value) {
                return Err(ValidationError::OutOfBounds {
                    channel,
                    value,
                    min: spec.bound.min,
                    max: spec.bound.max,
                });
            }
        }
        Ok(())
    }

    /// Validate and, when accepted, feed the feature engine.
    ///
    /// A rejected reading leaves histories and velocity trackers untouched
    /// and only records `InvalidReading`.
    pub fn ingest(&mut self, reading: &Reading) -> Result<FeatureVector, ValidationError> {
        if let Err(e) = self.validate(reading) {
            match &e {
                ValidationError::OutOfBounds {
                    channel,
                    value,
                    min,
                    max,
                } => tracing::warn!(
                    timestamp_ms = reading.timestamp_ms,
                    %channel,
                    value,
                    min,
                    max,
                    "reading rejected"
                ),
                ValidationError::Missing { channel } => tracing::warn!(
                    timestamp_ms = reading.timestamp_ms,
                    %channel,
                    "reading rejected: value missing"
                ),
            }
            self.state
                .report(StatusKind::InvalidReading, Some(&e.to_string()));
            return Err(e);
        }
        Ok(self.engine.derive(reading))
    }

    pub fn classify(&self, features: &FeatureVector) -> ClassLabel {
        let x = features.model_input(&self.model_channels);
        self.forest.predict(&x)
    }

    /// Ingest and classify one reading into a record without GPS.
    pub fn process(&mut self, reading: &Reading) -> Result<DuckRecord, ValidationError> {
        let features = self.ingest(reading)?;
        let prediction = self.classify(&features);
        tracing::debug!(
            timestamp_ms = features.timestamp_ms,
            prediction = prediction.0,
            "reading classified"
        );
        Ok(DuckRecord::new(features, prediction))
    }

    /// Drop rolling state, as after a node restart.
    pub fn reset(&mut self) {
        self.engine.reset();
    }
}
