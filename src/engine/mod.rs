//! Per-image classification engine
//!
//! - Attribute schema and validation
//! - Image decoding and tensor construction
//! - Inference adapter boundary (OpenVINO implementation)
//! - Logit to probability conversion
//! - Dominant attribute resolution and display filtering

pub mod schema;
pub mod preprocess;
pub mod adapter;
pub mod openvino_adapter;
pub mod attribute;
pub mod dominance;
pub mod filter;

pub use schema::{AttributeSchema, ExclusiveGroup};
pub use preprocess::{Normalization, TensorSpec};
pub use adapter::{DirectoryImageSource, ImageSource, InferenceAdapter, InputTensor, OutputTensor};
pub use openvino_adapter::OpenVinoAdapter;
pub use attribute::{AttributeClassifier, AttributeObservation};
pub use dominance::{resolve_dominant, DominantSelection};
pub use filter::DisplayFilter;
