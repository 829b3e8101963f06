//! Batch classification service configuration

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::engine::{Normalization, TensorSpec};
use crate::utils::image::ImageLocator;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub inference: InferenceConfig,
    pub schema: SchemaConfig,
    pub batch: BatchConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub rest_port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InferenceConfig {
    pub device: String,
    pub model_path: PathBuf,
    /// Square input edge (T)
    pub input_size: u32,
    #[serde(default)]
    pub normalization: Normalization,
    #[serde(default = "default_input_name")]
    pub input_name: String,
    #[serde(default = "default_image_timeout_ms")]
    pub image_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SchemaConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchConfig {
    pub images_dir: PathBuf,
    /// Number of images per run (K)
    pub image_count: usize,
    #[serde(default = "default_file_extension")]
    pub file_extension: String,
    #[serde(default)]
    pub run_on_startup: bool,
}

fn default_input_name() -> String {
    "input".to_string()
}

fn default_image_timeout_ms() -> u64 {
    30_000
}

fn default_file_extension() -> String {
    "png".to_string()
}

impl InferenceConfig {
    pub fn tensor_spec(&self) -> TensorSpec {
        TensorSpec::new(self.input_size, self.normalization.clone())
    }

    pub fn image_timeout(&self) -> Duration {
        Duration::from_millis(self.image_timeout_ms)
    }
}

impl BatchConfig {
    pub fn locators(&self) -> Vec<ImageLocator> {
        ImageLocator::sequence(self.image_count, &self.file_extension)
    }
}

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        if config.inference.input_size == 0 {
            anyhow::bail!("inference.input_size must be greater than zero");
        }
        Ok(config)
    }

    pub fn default_path() -> &'static str {
        "config.toml"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig { rest_port: 3000 },
            inference: InferenceConfig {
                device: "CPU".to_string(),
                model_path: PathBuf::from("models/celeba_attributes.onnx"),
                input_size: 256,
                normalization: Normalization::Unit,
                input_name: default_input_name(),
                image_timeout_ms: default_image_timeout_ms(),
            },
            schema: SchemaConfig {
                path: PathBuf::from("schema/celeba.toml"),
            },
            batch: BatchConfig {
                images_dir: PathBuf::from("images_256"),
                image_count: 24,
                file_extension: default_file_extension(),
                run_on_startup: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let config = Config::from_toml_str(
            r#"
            [server]
            rest_port = 8080

            [inference]
            device = "GPU"
            model_path = "models/attr.xml"
            input_size = 224
            image_timeout_ms = 500

            [inference.normalization]
            kind = "mean_std"
            mean = [0.5, 0.5, 0.5]
            std = [0.25, 0.25, 0.25]

            [schema]
            path = "schema/custom.toml"

            [batch]
            images_dir = "faces"
            image_count = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.server.rest_port, 8080);
        assert_eq!(config.inference.input_name, "input");
        assert_eq!(config.inference.image_timeout(), Duration::from_millis(500));
        assert_eq!(
            config.inference.tensor_spec(),
            TensorSpec::new(
                224,
                Normalization::MeanStd {
                    mean: [0.5; 3],
                    std: [0.25; 3]
                }
            )
        );
        assert_eq!(config.batch.file_extension, "png");
        assert!(!config.batch.run_on_startup);

        let names: Vec<String> = config.batch.locators().into_iter().map(|l| l.file_name).collect();
        assert_eq!(names, vec!["000001.png", "000002.png", "000003.png"]);
    }

    #[test]
    fn test_zero_input_size_rejected() {
        let err = Config::from_toml_str(
            r#"
            [server]
            rest_port = 1
            [inference]
            device = "CPU"
            model_path = "m.xml"
            input_size = 0
            [schema]
            path = "s.toml"
            [batch]
            images_dir = "i"
            image_count = 1
            "#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.batch.image_count, 24);
        assert_eq!(config.inference.input_size, 256);
        assert_eq!(config.inference.normalization, Normalization::Unit);
    }
}
