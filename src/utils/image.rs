//! Image locator naming and folder preparation

use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

/// Identifies one image of a batch; `id` is 1-based
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ImageLocator {
    pub id: usize,
    pub file_name: String,
}

impl ImageLocator {
    /// Locator following the `{id:06}.{ext}` naming convention
    pub fn new(id: usize, extension: &str) -> Self {
        Self {
            id,
            file_name: format!("{:06}.{}", id, extension),
        }
    }

    /// Locators `1..=count`, in processing order
    pub fn sequence(count: usize, extension: &str) -> Vec<Self> {
        (1..=count).map(|id| Self::new(id, extension)).collect()
    }
}

impl std::fmt::Display for ImageLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.file_name)
    }
}

/// Rename legacy `face_{i}.jpg` files to the `{i:06}.png` convention.
///
/// Only renames; the bytes are not transcoded. Returns the number of files renamed.
pub fn prepare_image_folder(dir: &Path, count: usize) -> anyhow::Result<usize> {
    let mut renamed = 0;

    for i in 1..=count {
        let old_path = dir.join(format!("face_{}.jpg", i));
        let new_path = dir.join(ImageLocator::new(i, "png").file_name);

        if old_path.exists() {
            std::fs::rename(&old_path, &new_path)?;
            info!("{:?} -> {:?}", old_path, new_path);
            renamed += 1;
        } else {
            warn!("File not found: {:?}", old_path);
        }
    }

    Ok(renamed)
}
