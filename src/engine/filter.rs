//! Display filtering of one image's observations

use serde::Deserialize;

use super::attribute::AttributeObservation;
use super::dominance::resolve_dominant;
use super::schema::AttributeSchema;

/// Probability an observation must exceed to count as high confidence
pub const HIGH_CONFIDENCE_THRESHOLD: f32 = 0.5;

/// Presentation switches, both off by default
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct DisplayFilter {
    #[serde(default)]
    pub dominant_only: bool,
    #[serde(default)]
    pub high_confidence_only: bool,
}

impl DisplayFilter {
    pub fn new(dominant_only: bool, high_confidence_only: bool) -> Self {
        Self {
            dominant_only,
            high_confidence_only,
        }
    }

    /// Apply the switches: dominance reduction first, then the confidence cut.
    pub fn apply(&self, observations: &[AttributeObservation], schema: &AttributeSchema) -> Vec<AttributeObservation> {
        let reduced = if self.dominant_only {
            resolve_dominant(observations, schema)
        } else {
            observations.to_vec()
        };

        if self.high_confidence_only {
            reduced
                .into_iter()
                .filter(|o| o.probability > HIGH_CONFIDENCE_THRESHOLD)
                .collect()
        } else {
            reduced
        }
    }
}
