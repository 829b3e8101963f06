//! Face Attribute Classifier
//!
//! Turns one decoded face image into per-attribute observations:
//! tensor build, model inference, then independent sigmoid per logit.

use std::sync::Arc;

use image::DynamicImage;
use serde::Serialize;
use tracing::debug;

use crate::error::PipelineError;
use crate::utils::math::sigmoid;

use super::adapter::{InferenceAdapter, InputTensor};
use super::preprocess::{build_tensor, TensorSpec};
use super::schema::AttributeSchema;

/// One attribute estimate for one image
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeObservation {
    pub index: usize,
    pub probability: f32,
    pub raw_score: f32,
    pub attribute_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_label: Option<String>,
}

impl AttributeObservation {
    /// Label shown to users and used as the statistics key
    pub fn display_key(&self) -> &str {
        self.display_label.as_deref().unwrap_or(&self.attribute_id)
    }
}

/// Map logits to independent probabilities.
///
/// No cross-element normalization: every value goes through its own sigmoid.
pub fn logits_to_probabilities(logits: &[f32]) -> Vec<f32> {
    logits.iter().map(|&l| sigmoid(l)).collect()
}

/// Build observations for indices `0..min(N, logits.len())`
pub fn observations_from_logits(logits: &[f32], schema: &AttributeSchema) -> Vec<AttributeObservation> {
    let probabilities = logits_to_probabilities(logits);

    logits
        .iter()
        .zip(probabilities)
        .take(schema.len())
        .enumerate()
        .map(|(index, (&raw_score, probability))| AttributeObservation {
            index,
            probability,
            raw_score,
            attribute_id: schema.attributes()[index].clone(),
            display_label: schema.label(index).map(str::to_string),
        })
        .collect()
}

/// Per-image classifier around an inference adapter
#[derive(Clone)]
pub struct AttributeClassifier {
    adapter: Arc<dyn InferenceAdapter>,
    schema: Arc<AttributeSchema>,
    spec: TensorSpec,
    input_name: String,
}

impl AttributeClassifier {
    pub fn new(
        adapter: Arc<dyn InferenceAdapter>,
        schema: Arc<AttributeSchema>,
        spec: TensorSpec,
        input_name: impl Into<String>,
    ) -> Self {
        Self {
            adapter,
            schema,
            spec,
            input_name: input_name.into(),
        }
    }

    pub fn schema(&self) -> &Arc<AttributeSchema> {
        &self.schema
    }

    pub fn tensor_spec(&self) -> &TensorSpec {
        &self.spec
    }

    /// Classify an already decoded image. Blocks on inference.
    pub fn classify(&self, image: &DynamicImage) -> Result<Vec<AttributeObservation>, PipelineError> {
        let input = InputTensor {
            name: self.input_name.clone(),
            data: build_tensor(image, &self.spec),
        };

        let output = self
            .adapter
            .infer(&input)
            .map_err(|e| PipelineError::Inference(format!("{:#}", e)))?;

        if output.data.len() < self.schema.len() {
            debug!(
                "Model returned {} logits for {} attributes; trailing attributes omitted",
                output.data.len(),
                self.schema.len()
            );
        }
        debug!("Attribute model raw output: {:?}", output.data);

        Ok(observations_from_logits(&output.data, &self.schema))
    }
}
