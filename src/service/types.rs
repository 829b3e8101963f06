//! Service layer types

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::engine::AttributeObservation;
use crate::error::{ErrorKind, PipelineError};
use crate::utils::image::ImageLocator;

use super::statistics::AggregateStatistics;

/// Result of classifying one image. Never mutated after creation.
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationOutcome {
    pub image_id: usize,
    pub locator: String,
    pub success: bool,
    /// Every valid index on success, empty on failure
    pub observations: Vec<AttributeObservation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl ClassificationOutcome {
    pub fn succeeded(locator: &ImageLocator, observations: Vec<AttributeObservation>) -> Self {
        Self {
            image_id: locator.id,
            locator: locator.file_name.clone(),
            success: true,
            observations,
            error: None,
            error_kind: None,
        }
    }

    pub fn failed(locator: &ImageLocator, error: &PipelineError) -> Self {
        Self {
            image_id: locator.id,
            locator: locator.file_name.clone(),
            success: false,
            observations: Vec::new(),
            error: Some(error.to_string()),
            error_kind: Some(error.kind()),
        }
    }
}

/// Progress snapshot published before each image starts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchProgress {
    /// 1-based position of the image being processed
    pub current: usize,
    pub total: usize,
    pub locator: String,
}

/// Read-only snapshot of a completed (or cancelled) batch run
#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub total_requested: usize,
    pub cancelled: bool,
    pub outcomes: Vec<ClassificationOutcome>,
    pub statistics: AggregateStatistics,
}

impl BatchResult {
    pub fn succeeded_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.succeeded_count()
    }

    pub fn outcome(&self, image_id: usize) -> Option<&ClassificationOutcome> {
        self.outcomes.iter().find(|o| o.image_id == image_id)
    }
}
