//! Completed per-cycle record handed to the transmission layer.

use serde::Serialize;

use crate::features::FeatureVector;
use crate::forest::ClassLabel;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuckRecord {
    pub timestamp_ms: u64,
    pub features: FeatureVector,
    pub prediction: ClassLabel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gps: Option<String>,
    pub has_valid_gps: bool,
}

impl DuckRecord {
    pub fn new(features: FeatureVector, prediction: ClassLabel) -> Self {
        Self {
            timestamp_ms: features.timestamp_ms,
            features,
            prediction,
            gps: None,
            has_valid_gps: false,
        }
    }

    /// Attach a GPS sentence, keeping at most `buffer_size - 1` characters.
    pub fn set_gps(&mut self, fix: Option<&str>, buffer_size: usize) {
        let limit = buffer_size.saturating_sub(1);
        match fix {
            Some(s) if !s.trim().is_empty() && limit > 0 => {
                self.gps = Some(s.chars().take(limit).collect());
                self.has_valid_gps = true;
            }
            _ => {
                self.gps = None;
                self.has_valid_gps = false;
            }
        }
    }
}
