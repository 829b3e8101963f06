//! Collaborator boundaries of the pipeline
//!
//! The inference engine and the image source are consumed through these
//! traits so the core never depends on a particular runtime or storage.

use std::path::PathBuf;

use async_trait::async_trait;
use image::DynamicImage;
use ndarray::Array4;
use tracing::debug;

use crate::error::PipelineError;
use crate::utils::image::ImageLocator;

use super::preprocess::decode_image;

/// Named, planar model input of shape `[1, 3, T, T]`
#[derive(Debug, Clone)]
pub struct InputTensor {
    pub name: String,
    pub data: Array4<f32>,
}

/// Raw model output (logits)
#[derive(Debug, Clone, Default)]
pub struct OutputTensor {
    pub data: Vec<f32>,
}

/// Runs the attribute model on one input tensor.
///
/// Implementations may block; callers run them on a blocking thread.
pub trait InferenceAdapter: Send + Sync + 'static {
    fn infer(&self, input: &InputTensor) -> anyhow::Result<OutputTensor>;
}

/// Resolves an image locator to a decoded raster
#[async_trait]
pub trait ImageSource: Send + Sync + 'static {
    async fn load(&self, locator: &ImageLocator) -> Result<DynamicImage, PipelineError>;
}

/// Reads images from a local folder
pub struct DirectoryImageSource {
    root: PathBuf,
}

impl DirectoryImageSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }
}

#[async_trait]
impl ImageSource for DirectoryImageSource {
    async fn load(&self, locator: &ImageLocator) -> Result<DynamicImage, PipelineError> {
        let path = self.root.join(&locator.file_name);
        debug!("Reading image {:?}", path);

        let data = tokio::fs::read(&path)
            .await
            .map_err(|e| PipelineError::image_decode(&locator.file_name, e))?;

        // Decoding is CPU bound
        let name = locator.file_name.clone();
        tokio::task::spawn_blocking(move || decode_image(&name, &data))
            .await
            .map_err(|e| PipelineError::image_decode(&locator.file_name, e))?
    }
}
