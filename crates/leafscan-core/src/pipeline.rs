//! The full decode → preprocess → predict → interpret chain.

use serde::{Deserialize, Serialize};

use crate::catalog::{ClassCatalog, LabelFormatError, DEFAULT_LABELS};
use crate::classifier::{ClassifierAdapter, LeafModel};
use crate::decode::{self, ChannelOrder, FilterType, PixelTensor, Upload};
use crate::display::{display_preview, DEFAULT_PREVIEW_EDGE};
use crate::error::ClassifyError;
use crate::interpret::{interpret, ClassificationResult};
use crate::preprocess::{PreprocessConfig, Preprocessor, DEFAULT_INPUT_SIZE};
use crate::tensor::{PixelScale, ShapeError};

/// Pipeline settings. Missing fields take the defaults of the stock leaf model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Model input width and height.
    pub input_size: u32,
    pub filter: FilterType,
    /// Channel order the model was trained on.
    pub channel_order: ChannelOrder,
    pub pixel_scale: PixelScale,
    /// Class labels in model output order.
    pub labels: Vec<String>,
    /// Longest edge of the display preview.
    pub preview_edge: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_size: DEFAULT_INPUT_SIZE,
            filter: FilterType::Bilinear,
            channel_order: ChannelOrder::Bgr,
            pixel_scale: PixelScale::Raw,
            labels: DEFAULT_LABELS.iter().map(|s| s.to_string()).collect(),
            preview_edge: DEFAULT_PREVIEW_EDGE,
        }
    }
}

impl PipelineConfig {
    pub fn preprocess_config(&self) -> PreprocessConfig {
        PreprocessConfig {
            size: self.input_size,
            filter: self.filter,
            channel_order: self.channel_order,
            pixel_scale: self.pixel_scale,
        }
    }

    pub fn catalog(&self) -> Result<ClassCatalog, LabelFormatError> {
        ClassCatalog::new(self.labels.iter().cloned())
    }
}

/// A ready-to-use classifier for single leaf images.
///
/// Construction performs every check that does not depend on the image:
/// labels are well formed, the model's output width equals the catalog
/// length, and the configured preprocessing yields the tensor the model
/// declares.
#[derive(Debug)]
pub struct LeafPipeline<M> {
    catalog: ClassCatalog,
    preprocessor: Preprocessor,
    adapter: ClassifierAdapter<M>,
    preview_edge: u32,
}

impl<M: LeafModel> LeafPipeline<M> {
    pub fn new(config: &PipelineConfig, model: M) -> Result<Self, ClassifyError> {
        let catalog = config.catalog()?;
        let preprocess = config.preprocess_config();
        model.signature().accepts(&preprocess)?;
        let adapter = ClassifierAdapter::new(model, &catalog)?;

        log::info!(
            "pipeline ready: {} classes, input {:?} {:?}",
            catalog.len(),
            adapter.signature().input_shape,
            adapter.signature().channel_order
        );

        Ok(Self {
            catalog,
            preprocessor: Preprocessor::new(preprocess),
            adapter,
            preview_edge: config.preview_edge,
        })
    }

    /// Classify raw JPEG/PNG bytes.
    pub fn classify(&self, bytes: &[u8]) -> Result<ClassificationResult, ClassifyError> {
        let image = decode::decode(bytes)?;
        self.classify_image(&image)
    }

    /// Classify an upload, validating its asserted extension.
    pub fn classify_upload(&self, upload: &Upload<'_>) -> Result<ClassificationResult, ClassifyError> {
        let image = decode::decode_upload(upload)?;
        self.classify_image(&image)
    }

    /// Classify an already decoded image.
    pub fn classify_image(&self, image: &PixelTensor) -> Result<ClassificationResult, ClassifyError> {
        let input = self.preprocessor.preprocess(image)?;
        let probs = self.adapter.predict(&input)?;
        let result = interpret(&probs, &self.catalog)?;

        log::info!("classified leaf as {}", result);
        Ok(result)
    }

    /// RGB preview of `image` for display, sized by the configured edge.
    pub fn preview(&self, image: &PixelTensor) -> Result<PixelTensor, ShapeError> {
        display_preview(image, self.preview_edge)
    }

    pub fn catalog(&self) -> &ClassCatalog {
        &self.catalog
    }

    pub fn preprocessor(&self) -> &Preprocessor {
        &self.preprocessor
    }

    pub fn adapter(&self) -> &ClassifierAdapter<M> {
        &self.adapter
    }
}
