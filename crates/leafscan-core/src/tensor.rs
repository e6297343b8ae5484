//! Explicitly shaped tensors exchanged with the classifier.
//!
//! `InputTensor` is always NHWC with a fixed rank of four, and its element
//! count is checked against its shape when it is built. Shape disagreements are
//! reported as [`ShapeError`] instead of being reshaped or broadcast.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::{ChannelOrder, PixelTensor};

/// Errors raised when a tensor does not have the shape a stage requires.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShapeError {
    /// An image (or resize target) has a zero dimension.
    #[error("Image has zero extent: {width}x{height}")]
    EmptyImage { width: u32, height: u32 },

    /// A buffer's length disagrees with the dimensions it claims.
    #[error("Buffer length mismatch: expected {expected} elements, got {actual}")]
    BufferLength { expected: usize, actual: usize },

    /// Input shape differs from the shape the model declares.
    #[error("Input shape mismatch: model expects {expected:?}, got {actual:?}")]
    InputShape {
        expected: [usize; 4],
        actual: [usize; 4],
    },

    /// Input channel order differs from the order the model was trained on.
    #[error("Channel order mismatch: model expects {expected:?}, got {actual:?}")]
    ChannelOrder {
        expected: ChannelOrder,
        actual: ChannelOrder,
    },

    /// Input element type differs from the type the model consumes.
    #[error("Element type mismatch: model expects {expected:?}, got {actual:?}")]
    ElementType {
        expected: ElementType,
        actual: ElementType,
    },
}

/// Element type of an [`InputTensor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    U8,
    F32,
}

/// How 8-bit pixel values are presented to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelScale {
    /// Unmodified `u8` values in 0..=255.
    #[default]
    Raw,
    /// `f32` values divided by 255, in 0.0..=1.0.
    UnitRange,
}

impl PixelScale {
    pub fn element_type(self) -> ElementType {
        match self {
            PixelScale::Raw => ElementType::U8,
            PixelScale::UnitRange => ElementType::F32,
        }
    }
}

/// Flat element storage of an [`InputTensor`].
#[derive(Debug, Clone, PartialEq)]
pub enum TensorData {
    U8(Vec<u8>),
    F32(Vec<f32>),
}

impl TensorData {
    pub fn len(&self) -> usize {
        match self {
            TensorData::U8(v) => v.len(),
            TensorData::F32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn element_type(&self) -> ElementType {
        match self {
            TensorData::U8(_) => ElementType::U8,
            TensorData::F32(_) => ElementType::F32,
        }
    }
}

/// A `(batch, height, width, channel)` tensor ready for the classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct InputTensor {
    shape: [usize; 4],
    order: ChannelOrder,
    data: TensorData,
}

impl InputTensor {
    /// Build a tensor, checking that `data` holds exactly `product(shape)` elements.
    pub fn new(shape: [usize; 4], order: ChannelOrder, data: TensorData) -> Result<Self, ShapeError> {
        let expected = shape.iter().product::<usize>();
        if data.len() != expected {
            return Err(ShapeError::BufferLength {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { shape, order, data })
    }

    /// Wrap a single image as a batch of one, converting elements per `scale`.
    pub fn from_pixels(pixels: &PixelTensor, scale: PixelScale) -> Result<Self, ShapeError> {
        let [h, w, c] = pixels.shape();
        let data = match scale {
            PixelScale::Raw => TensorData::U8(pixels.pixels.clone()),
            PixelScale::UnitRange => TensorData::F32(
                pixels
                    .pixels
                    .iter()
                    .map(|&v| v as f32 / 255.0)
                    .collect(),
            ),
        };
        Self::new([1, h, w, c], pixels.order, data)
    }

    /// Shape as `[batch, height, width, channels]`.
    pub fn shape(&self) -> [usize; 4] {
        self.shape
    }

    pub fn batch(&self) -> usize {
        self.shape[0]
    }

    pub fn height(&self) -> usize {
        self.shape[1]
    }

    pub fn width(&self) -> usize {
        self.shape[2]
    }

    pub fn channels(&self) -> usize {
        self.shape[3]
    }

    pub fn order(&self) -> ChannelOrder {
        self.order
    }

    pub fn element_type(&self) -> ElementType {
        self.data.element_type()
    }

    pub fn data(&self) -> &TensorData {
        &self.data
    }

    pub fn into_data(self) -> TensorData {
        self.data
    }
}

/// Per-class scores produced by the classifier, in catalog index order.
///
/// Scores are expected to look like a softmax output but nothing here checks
/// that they are non-negative or sum to one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProbabilityVector(Vec<f32>);

impl ProbabilityVector {
    pub fn new(scores: Vec<f32>) -> Self {
        Self(scores)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Index and value of the highest score.
    ///
    /// Ties go to the lowest index. NaN scores never win; `None` is returned
    /// when the vector is empty or holds only NaN.
    pub fn argmax(&self) -> Option<(usize, f32)> {
        let mut best: Option<(usize, f32)> = None;
        for (i, &score) in self.0.iter().enumerate() {
            if score.is_nan() {
                continue;
            }
            match best {
                Some((_, top)) if score <= top => {}
                _ => best = Some((i, score)),
            }
        }
        best
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }
}

impl From<Vec<f32>> for ProbabilityVector {
    fn from(scores: Vec<f32>) -> Self {
        Self(scores)
    }
}
