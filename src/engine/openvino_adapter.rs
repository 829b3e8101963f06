//! OpenVINO Inference Adapter
//!
//! Loads and compiles the attribute model once at construction; the model is
//! ready for the whole lifetime of the adapter.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use openvino::{CompiledModel, Core, ElementType, Shape, Tensor};
use parking_lot::Mutex;
use tracing::{debug, info};

use super::adapter::{InferenceAdapter, InputTensor, OutputTensor};

/// Wrapper for OpenVINO CompiledModel that implements Send
struct SafeCompiledModel(CompiledModel);
unsafe impl Send for SafeCompiledModel {}

/// Inference adapter backed by an OpenVINO compiled model
pub struct OpenVinoAdapter {
    // Rust bindings need `&mut` to create requests
    compiled: Mutex<SafeCompiledModel>,
    device: String,
}

impl OpenVinoAdapter {
    /// Read and compile the model on the given device (e.g. "CPU", "GPU")
    pub fn load(model_path: &Path, device: &str) -> Result<Self> {
        let path = model_path
            .to_str()
            .with_context(|| format!("model path {:?} is not valid UTF-8", model_path))?;

        info!("Loading attribute model from {} on {}", path, device);
        let start = Instant::now();

        let mut core = Core::new()?;
        let model = core
            .read_model_from_file(path, "")
            .with_context(|| format!("failed to read model {}", path))?;
        let compiled = core
            .compile_model(&model, device.into())
            .with_context(|| format!("failed to compile model for {}", device))?;

        info!("Attribute model loaded in {:?}", start.elapsed());

        Ok(Self {
            compiled: Mutex::new(SafeCompiledModel(compiled)),
            device: device.to_string(),
        })
    }

    pub fn device(&self) -> &str {
        &self.device
    }
}

impl InferenceAdapter for OpenVinoAdapter {
    fn infer(&self, input: &InputTensor) -> Result<OutputTensor> {
        let mut request = self.compiled.lock().0.create_infer_request()?;

        let dims: Vec<i64> = input.data.shape().iter().map(|&d| d as i64).collect();
        let input_shape = Shape::new(&dims)?;
        let mut tensor = Tensor::new(ElementType::F32, &input_shape)?;

        let input_data = input
            .data
            .as_slice()
            .context("input tensor is not contiguous")?;
        unsafe {
            let tensor_data = tensor.get_raw_data_mut()?.as_mut_ptr() as *mut f32;
            std::ptr::copy_nonoverlapping(input_data.as_ptr(), tensor_data, input_data.len());
        }

        if input.name.is_empty() {
            request.set_input_tensor(&tensor)?;
        } else {
            request.set_tensor(&input.name, &tensor)?;
        }
        request.infer()?;

        let output = request.get_output_tensor()?;
        let output_len = output.get_shape()?.get_dimensions().iter().product::<i64>() as usize;

        let data: Vec<f32> = unsafe {
            let ptr = output.get_raw_data()?.as_ptr() as *const f32;
            std::slice::from_raw_parts(ptr, output_len).to_vec()
        };
        debug!("OpenVINO output length {}", data.len());

        Ok(OutputTensor { data })
    }
}
