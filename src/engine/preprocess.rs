//! Image preprocessing for attribute classification
//!
//! Decodes images (honouring EXIF orientation) and turns them into planar,
//! channel-first `[1, 3, T, T]` tensors.

use image::imageops::FilterType;
use image::DynamicImage;
use ndarray::Array4;
use serde::Deserialize;

use crate::error::PipelineError;

/// Default model input edge (T)
pub const DEFAULT_INPUT_SIZE: u32 = 256;

/// ImageNet channel statistics, used by most torchvision backbones
pub const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
pub const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Per-channel value normalization applied after scaling to [0, 1]
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Normalization {
    /// `value / 255`
    #[default]
    Unit,
    /// `(value / 255 - mean[c]) / std[c]`
    MeanStd { mean: [f32; 3], std: [f32; 3] },
}

impl Normalization {
    pub fn imagenet() -> Self {
        Normalization::MeanStd {
            mean: IMAGENET_MEAN,
            std: IMAGENET_STD,
        }
    }

    #[inline]
    fn apply(&self, channel: usize, value: u8) -> f32 {
        let scaled = value as f32 / 255.0;
        match self {
            Normalization::Unit => scaled,
            Normalization::MeanStd { mean, std } => (scaled - mean[channel]) / std[channel],
        }
    }
}

/// Target tensor geometry and normalization
#[derive(Debug, Clone, PartialEq)]
pub struct TensorSpec {
    pub size: u32,
    pub normalization: Normalization,
}

impl TensorSpec {
    pub fn new(size: u32, normalization: Normalization) -> Self {
        Self {
            size,
            normalization,
        }
    }

    /// Model input shape `[1, 3, T, T]`
    pub fn shape(&self) -> [usize; 4] {
        let t = self.size as usize;
        [1, 3, t, t]
    }
}

impl Default for TensorSpec {
    fn default() -> Self {
        Self::new(DEFAULT_INPUT_SIZE, Normalization::Unit)
    }
}

/// Resample an image to `T x T` and convert it to a planar NCHW tensor.
///
/// The raster is read as RGBA; alpha is ignored. Channel 0 holds all red
/// values, channel 1 green, channel 2 blue.
pub fn build_tensor(image: &DynamicImage, spec: &TensorSpec) -> Array4<f32> {
    let t = spec.size;
    let resized = if image.width() == t && image.height() == t {
        image.to_rgba8()
    } else {
        image.resize_exact(t, t, FilterType::Triangle).to_rgba8()
    };

    let mut tensor = Array4::<f32>::zeros(spec.shape());

    for (x, y, pixel) in resized.enumerate_pixels() {
        let (x, y) = (x as usize, y as usize);
        for c in 0..3 {
            tensor[[0, c, y, x]] = spec.normalization.apply(c, pixel[c]);
        }
    }

    tensor
}

/// Decode image from bytes with EXIF orientation handling
pub fn decode_image(locator: &str, data: &[u8]) -> Result<DynamicImage, PipelineError> {
    let image =
        image::load_from_memory(data).map_err(|e| PipelineError::image_decode(locator, e))?;

    if image.width() == 0 || image.height() == 0 {
        return Err(PipelineError::image_decode(locator, "image has no pixels"));
    }

    Ok(apply_exif_orientation(data, image))
}

/// Apply EXIF orientation to correct image rotation
fn apply_exif_orientation(data: &[u8], image: DynamicImage) -> DynamicImage {
    use std::io::Cursor;

    let orientation = match exif::Reader::new().read_from_container(&mut Cursor::new(data)) {
        Ok(exif_data) => exif_data
            .get_field(exif::Tag::Orientation, exif::In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .unwrap_or(1),
        Err(_) => 1,
    };

    // See: https://exiftool.org/TagNames/EXIF.html (Orientation)
    match orientation {
        2 => image.fliph(),
        3 => image.rotate180(),
        4 => image.flipv(),
        5 => image.rotate90().fliph(),
        6 => image.rotate90(),
        7 => image.rotate270().fliph(),
        8 => image.rotate270(),
        _ => image,
    }
}
