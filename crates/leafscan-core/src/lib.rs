//! Leafscan Core - leaf photo disease classification
//!
//! This crate turns an uploaded leaf photograph into a
//! `(plant type, disease, confidence)` triple. The stages run strictly forward:
//!
//! 1. [`decode`] - JPEG/PNG bytes to an RGB [`PixelTensor`]
//! 2. [`preprocess`] - stretch to the model size, reorder channels, add the batch axis
//! 3. [`classifier`] - validate and run the model artifact
//! 4. [`interpret`] - argmax, confidence and label split
//!
//! [`LeafPipeline`] wires the four together. The artifact itself is opaque:
//! anything implementing [`LeafModel`] can be plugged in, and [`LazyModel`]
//! keeps a loaded artifact around for reuse.

pub mod catalog;
pub mod classifier;
pub mod decode;
pub mod display;
pub mod error;
pub mod interpret;
pub mod pipeline;
pub mod preprocess;
pub mod tensor;

#[cfg(test)]
pub(crate) mod fixtures;

pub use catalog::{CatalogMismatchError, ClassCatalog, ClassLabel, LabelFormatError};
pub use classifier::{ClassifierAdapter, LazyModel, LeafModel, ModelLoader, ModelSignature};
pub use decode::{ChannelOrder, DecodeError, FilterType, PixelTensor, Upload};
pub use error::ClassifyError;
pub use interpret::{interpret, ClassificationResult};
pub use pipeline::{LeafPipeline, PipelineConfig};
pub use preprocess::{PreprocessConfig, Preprocessor};
pub use tensor::{ElementType, InputTensor, PixelScale, ProbabilityVector, ShapeError, TensorData};
