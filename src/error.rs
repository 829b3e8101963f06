//! Pipeline error types

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Errors raised while validating an [`AttributeSchema`](crate::engine::AttributeSchema).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("schema must declare at least one attribute")]
    EmptyAttributes,
    #[error("attribute id \"{id}\" is declared more than once")]
    DuplicateAttributeId { id: String },
    #[error("group \"{group}\" has no indices")]
    EmptyGroup { group: String },
    #[error("group \"{group}\" references index {index} but schema has {len} attributes")]
    IndexOutOfRange { group: String, index: usize, len: usize },
    #[error("index {index} appears in both group \"{first}\" and group \"{second}\"")]
    DuplicateIndex {
        index: usize,
        first: String,
        second: String,
    },
    #[error("display label for index {index} is out of range ({len} attributes)")]
    LabelOutOfRange { index: usize, len: usize },
    #[error("failed to read schema file {path}: {message}")]
    Read { path: PathBuf, message: String },
    #[error("failed to parse schema file: {0}")]
    Parse(String),
}

/// Errors produced by the classification pipeline.
///
/// `ImageDecode`, `Inference` and `Timeout` are per-image and never abort a batch.
/// `Schema` is fatal and raised before any image is processed.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("image decode failed for {locator}: {message}")]
    ImageDecode { locator: String, message: String },
    #[error("inference failed: {0}")]
    Inference(String),
    #[error("image {locator} timed out after {timeout_ms}ms")]
    Timeout { locator: String, timeout_ms: u64 },
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl PipelineError {
    pub fn image_decode(locator: impl Into<String>, err: impl std::fmt::Display) -> Self {
        PipelineError::ImageDecode {
            locator: locator.into(),
            message: err.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::ImageDecode { .. } => ErrorKind::ImageDecode,
            PipelineError::Inference(_) => ErrorKind::Inference,
            PipelineError::Timeout { .. } => ErrorKind::Timeout,
            PipelineError::Schema(_) => ErrorKind::Schema,
            PipelineError::Config(_) => ErrorKind::Config,
        }
    }
}

/// Serializable error category attached to failed outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ImageDecode,
    Inference,
    Timeout,
    Schema,
    Config,
}
