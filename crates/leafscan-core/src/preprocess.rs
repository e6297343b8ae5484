//! Turns a decoded image into the classifier's input tensor.
//!
//! Steps, in order: full-frame stretch to `size x size`, reorder channels into
//! the model's order, convert elements to the model's type, add the batch axis.
//! The source `PixelTensor` is borrowed and never modified, so a display copy
//! made from the same decode is unaffected.

use serde::{Deserialize, Serialize};

use crate::decode::{self, ChannelOrder, FilterType, PixelTensor};
use crate::tensor::{InputTensor, PixelScale, ShapeError};

/// Spatial size the leaf model was trained at.
pub const DEFAULT_INPUT_SIZE: u32 = 256;

/// Settings for [`Preprocessor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreprocessConfig {
    /// Output width and height in pixels.
    pub size: u32,
    /// Interpolation used by the stretch.
    pub filter: FilterType,
    /// Channel order the model consumes.
    pub channel_order: ChannelOrder,
    /// Element conversion the model consumes.
    pub pixel_scale: PixelScale,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_INPUT_SIZE,
            filter: FilterType::Bilinear,
            channel_order: ChannelOrder::Bgr,
            pixel_scale: PixelScale::Raw,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Preprocessor {
    config: PreprocessConfig,
}

impl Preprocessor {
    pub fn new(config: PreprocessConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PreprocessConfig {
        &self.config
    }

    /// Produce a `(1, size, size, 3)` tensor from `image`.
    ///
    /// # Errors
    ///
    /// `ShapeError::EmptyImage` if `image` has a zero dimension,
    /// `ShapeError::BufferLength` if its buffer disagrees with its dimensions.
    pub fn preprocess(&self, image: &PixelTensor) -> Result<InputTensor, ShapeError> {
        let size = self.config.size;
        let mut resized = decode::resize(image, size, size, self.config.filter)?;
        resized.reorder(self.config.channel_order);

        let tensor = InputTensor::from_pixels(&resized, self.config.pixel_scale)?;
        log::debug!(
            "preprocessed {}x{} -> {:?} ({:?}, {:?})",
            image.width,
            image.height,
            tensor.shape(),
            tensor.order(),
            tensor.element_type()
        );
        Ok(tensor)
    }
}
