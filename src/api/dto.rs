//! REST API request/response data transfer objects

use std::collections::BTreeMap;

use serde::Serialize;

use crate::engine::{AttributeObservation, AttributeSchema, ExclusiveGroup};
use crate::service::BatchProgress;

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub healthy: bool,
    pub version: String,
    pub uptime_secs: u64,
    pub schema_attributes: usize,
    pub image_count: usize,
    pub running: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<BatchProgress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_run_id: Option<String>,
}

/// Cancel response
#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub cancelled: bool,
    pub message: String,
}

/// Filtered observations of one image
#[derive(Debug, Serialize)]
pub struct ImageAttributesResponse {
    pub image_id: usize,
    pub locator: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub dominant_only: bool,
    pub high_confidence_only: bool,
    pub attributes: Vec<AttributeObservation>,
}

/// Schema summary
#[derive(Debug, Serialize)]
pub struct SchemaResponse {
    pub attributes: Vec<String>,
    pub groups: Vec<ExclusiveGroup>,
    pub labels: BTreeMap<usize, String>,
}

impl From<&AttributeSchema> for SchemaResponse {
    fn from(schema: &AttributeSchema) -> Self {
        Self {
            attributes: schema.attributes().to_vec(),
            groups: schema.groups().to_vec(),
            labels: schema
                .labels()
                .iter()
                .map(|(index, label)| (*index, label.clone()))
                .collect(),
        }
    }
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ErrorResponse {
    pub fn new(error: &str, code: &str) -> Self {
        Self {
            error: error.to_string(),
            code: code.to_string(),
        }
    }
}
