//! Classifier adapter around an opaque, pretrained model artifact.
//!
//! The artifact is anything implementing [`LeafModel`]: it declares a
//! [`ModelSignature`] and maps an [`InputTensor`] to raw scores. The
//! [`ClassifierAdapter`] owns the checks the artifact is not trusted with:
//! input shape, channel order and element type against the signature, and the
//! output width against the class catalog.
//!
//! Loading and caching the artifact lives in [`cache`].

pub mod cache;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogMismatchError, ClassCatalog};
use crate::decode::ChannelOrder;
use crate::error::ClassifyError;
use crate::preprocess::{PreprocessConfig, DEFAULT_INPUT_SIZE};
use crate::tensor::{InputTensor, PixelScale, ProbabilityVector, ShapeError};

pub use cache::{LazyModel, ModelLoader};

/// What a model artifact consumes and produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSignature {
    /// `[batch, height, width, channels]`.
    pub input_shape: [usize; 4],
    /// Channel order the model was trained on.
    pub channel_order: ChannelOrder,
    /// Element conversion the model was trained on.
    pub pixel_scale: PixelScale,
    /// Number of scores per prediction.
    pub output_width: usize,
}

impl ModelSignature {
    /// Signature of the stock leaf model: `(1, 256, 256, 3)` raw BGR bytes.
    pub fn leaf(output_width: usize) -> Self {
        let size = DEFAULT_INPUT_SIZE as usize;
        Self {
            input_shape: [1, size, size, 3],
            channel_order: ChannelOrder::Bgr,
            pixel_scale: PixelScale::Raw,
            output_width,
        }
    }

    /// Verify that tensors built with `config` will satisfy this signature.
    pub fn accepts(&self, config: &PreprocessConfig) -> Result<(), ShapeError> {
        let size = config.size as usize;
        let produced = [1, size, size, 3];
        if produced != self.input_shape {
            return Err(ShapeError::InputShape {
                expected: self.input_shape,
                actual: produced,
            });
        }
        if config.channel_order != self.channel_order {
            return Err(ShapeError::ChannelOrder {
                expected: self.channel_order,
                actual: config.channel_order,
            });
        }
        if config.pixel_scale.element_type() != self.pixel_scale.element_type() {
            return Err(ShapeError::ElementType {
                expected: self.pixel_scale.element_type(),
                actual: config.pixel_scale.element_type(),
            });
        }
        Ok(())
    }

    fn check_input(&self, input: &InputTensor) -> Result<(), ShapeError> {
        if input.shape() != self.input_shape {
            return Err(ShapeError::InputShape {
                expected: self.input_shape,
                actual: input.shape(),
            });
        }
        if input.order() != self.channel_order {
            return Err(ShapeError::ChannelOrder {
                expected: self.channel_order,
                actual: input.order(),
            });
        }
        if input.element_type() != self.pixel_scale.element_type() {
            return Err(ShapeError::ElementType {
                expected: self.pixel_scale.element_type(),
                actual: input.element_type(),
            });
        }
        Ok(())
    }
}

/// A loaded, read-only classifier artifact.
///
/// `run` must be deterministic for a given input and must not mutate the
/// artifact.
pub trait LeafModel {
    fn signature(&self) -> &ModelSignature;

    /// Raw per-class scores for a single-image batch.
    fn run(&self, input: &InputTensor) -> Result<Vec<f32>, ClassifyError>;
}

impl<M: LeafModel + ?Sized> LeafModel for &M {
    fn signature(&self) -> &ModelSignature {
        (**self).signature()
    }

    fn run(&self, input: &InputTensor) -> Result<Vec<f32>, ClassifyError> {
        (**self).run(input)
    }
}

impl<M: LeafModel + ?Sized> LeafModel for Arc<M> {
    fn signature(&self) -> &ModelSignature {
        (**self).signature()
    }

    fn run(&self, input: &InputTensor) -> Result<Vec<f32>, ClassifyError> {
        (**self).run(input)
    }
}

impl<M: LeafModel + ?Sized> LeafModel for Box<M> {
    fn signature(&self) -> &ModelSignature {
        (**self).signature()
    }

    fn run(&self, input: &InputTensor) -> Result<Vec<f32>, ClassifyError> {
        (**self).run(input)
    }
}

/// Validating wrapper exposing `predict(InputTensor) -> ProbabilityVector`.
#[derive(Debug, Clone)]
pub struct ClassifierAdapter<M> {
    model: M,
    catalog_len: usize,
}

impl<M: LeafModel> ClassifierAdapter<M> {
    /// Wrap `model`, failing if its declared output width differs from the
    /// catalog length.
    pub fn new(model: M, catalog: &ClassCatalog) -> Result<Self, CatalogMismatchError> {
        catalog.ensure_width(model.signature().output_width)?;
        Ok(Self {
            model,
            catalog_len: catalog.len(),
        })
    }

    pub fn signature(&self) -> &ModelSignature {
        self.model.signature()
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Run the model on `input`.
    ///
    /// # Errors
    ///
    /// `ClassifyError::Shape` if `input` does not match the signature,
    /// `ClassifyError::CatalogMismatch` if the model returns a vector whose
    /// length is not the catalog length, and whatever the model itself raises.
    pub fn predict(&self, input: &InputTensor) -> Result<ProbabilityVector, ClassifyError> {
        self.model.signature().check_input(input)?;

        let scores = self.model.run(input)?;
        if scores.len() != self.catalog_len {
            return Err(CatalogMismatchError {
                catalog_len: self.catalog_len,
                output_width: scores.len(),
            }
            .into());
        }

        log::debug!("model returned {} scores", scores.len());
        Ok(ProbabilityVector::new(scores))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::tensor::TensorData;

    /// Deterministic stand-in for a trained model.
    ///
    /// Scores are derived from the mean of each channel so that different
    /// inputs give different outputs, then padded or cut to `emit` scores.
    #[derive(Debug)]
    pub(crate) struct StubModel {
        pub signature: ModelSignature,
        pub emit: usize,
    }

    impl StubModel {
        pub(crate) fn new(output_width: usize) -> Self {
            Self {
                signature: ModelSignature::leaf(output_width),
                emit: output_width,
            }
        }
    }

    impl LeafModel for StubModel {
        fn signature(&self) -> &ModelSignature {
            &self.signature
        }

        fn run(&self, input: &InputTensor) -> Result<Vec<f32>, ClassifyError> {
            let mut sums = [0f32; 3];
            match input.data() {
                TensorData::U8(v) => {
                    for (i, &x) in v.iter().enumerate() {
                        sums[i % 3] += x as f32 / 255.0;
                    }
                }
                TensorData::F32(v) => {
                    for (i, &x) in v.iter().enumerate() {
                        sums[i % 3] += x;
                    }
                }
            }
            let n = (input.data().len() / 3).max(1) as f32;
            let means: Vec<f32> = sums.iter().map(|s| s / n).collect();
            let total: f32 = means.iter().sum::<f32>().max(f32::EPSILON);
            Ok((0..self.emit).map(|i| means[i % 3] / total).collect())
        }
    }

    /// Model that always returns the same scores.
    #[derive(Debug)]
    pub(crate) struct FixedModel {
        pub signature: ModelSignature,
        pub scores: Vec<f32>,
    }

    impl FixedModel {
        pub(crate) fn new(scores: Vec<f32>) -> Self {
            Self {
                signature: ModelSignature::leaf(scores.len()),
                scores,
            }
        }
    }

    impl LeafModel for FixedModel {
        fn signature(&self) -> &ModelSignature {
            &self.signature
        }

        fn run(&self, _input: &InputTensor) -> Result<Vec<f32>, ClassifyError> {
            Ok(self.scores.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{FixedModel, StubModel};
    use super::*;
    use crate::decode::PixelTensor;
    use crate::preprocess::Preprocessor;
    use crate::tensor::TensorData;

    fn leaf_input(rgb: [u8; 3]) -> InputTensor {
        let src = PixelTensor::new(32, 24, ChannelOrder::Rgb, rgb.repeat(32 * 24));
        Preprocessor::default().preprocess(&src).unwrap()
    }

    #[test]
    fn test_adapter_rejects_catalog_width_mismatch() {
        let catalog = ClassCatalog::default();
        let result = ClassifierAdapter::new(StubModel::new(4), &catalog);
        assert_eq!(
            result.err(),
            Some(CatalogMismatchError {
                catalog_len: 3,
                output_width: 4
            })
        );
    }

    #[test]
    fn test_predict_returns_catalog_width() {
        let adapter = ClassifierAdapter::new(StubModel::new(3), &ClassCatalog::default()).unwrap();
        let probs = adapter.predict(&leaf_input([10, 200, 30])).unwrap();
        assert_eq!(probs.len(), 3);
    }

    #[test]
    fn test_predict_detects_runtime_output_mismatch() {
        // Signature claims 3 outputs but the artifact emits 4
        let mut model = StubModel::new(3);
        model.emit = 4;
        let adapter = ClassifierAdapter::new(model, &ClassCatalog::default()).unwrap();

        let err = adapter.predict(&leaf_input([1, 2, 3])).unwrap_err();
        assert_eq!(
            err,
            ClassifyError::CatalogMismatch(CatalogMismatchError {
                catalog_len: 3,
                output_width: 4
            })
        );
    }

    #[test]
    fn test_predict_never_truncates_short_output() {
        let mut model = StubModel::new(3);
        model.emit = 2;
        let adapter = ClassifierAdapter::new(model, &ClassCatalog::default()).unwrap();

        assert!(matches!(
            adapter.predict(&leaf_input([1, 2, 3])),
            Err(ClassifyError::CatalogMismatch(_))
        ));
    }

    #[test]
    fn test_predict_rejects_wrong_shape() {
        let adapter = ClassifierAdapter::new(StubModel::new(3), &ClassCatalog::default()).unwrap();
        let small = InputTensor::new([1, 8, 8, 3], ChannelOrder::Bgr, TensorData::U8(vec![0; 192]))
            .unwrap();

        assert_eq!(
            adapter.predict(&small),
            Err(ClassifyError::Shape(ShapeError::InputShape {
                expected: [1, 256, 256, 3],
                actual: [1, 8, 8, 3]
            }))
        );
    }

    #[test]
    fn test_predict_rejects_wrong_channel_order() {
        let adapter = ClassifierAdapter::new(StubModel::new(3), &ClassCatalog::default()).unwrap();
        let rgb = InputTensor::new(
            [1, 256, 256, 3],
            ChannelOrder::Rgb,
            TensorData::U8(vec![0; 256 * 256 * 3]),
        )
        .unwrap();

        assert!(matches!(
            adapter.predict(&rgb),
            Err(ClassifyError::Shape(ShapeError::ChannelOrder { .. }))
        ));
    }

    #[test]
    fn test_predict_rejects_wrong_element_type() {
        let adapter = ClassifierAdapter::new(StubModel::new(3), &ClassCatalog::default()).unwrap();
        let float = InputTensor::new(
            [1, 256, 256, 3],
            ChannelOrder::Bgr,
            TensorData::F32(vec![0.0; 256 * 256 * 3]),
        )
        .unwrap();

        assert!(matches!(
            adapter.predict(&float),
            Err(ClassifyError::Shape(ShapeError::ElementType { .. }))
        ));
    }

    #[test]
    fn test_predict_is_bit_identical_across_calls() {
        let adapter = ClassifierAdapter::new(StubModel::new(3), &ClassCatalog::default()).unwrap();
        let input = leaf_input([90, 160, 40]);

        let a = adapter.predict(&input).unwrap();
        let b = adapter.predict(&input).unwrap();
        let bits = |v: &ProbabilityVector| v.as_slice().iter().map(|x| x.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&a), bits(&b));
    }

    #[test]
    fn test_adapter_over_shared_model() {
        let model = Arc::new(FixedModel::new(vec![0.2, 0.3, 0.5]));
        let catalog = ClassCatalog::default();
        let a = ClassifierAdapter::new(Arc::clone(&model), &catalog).unwrap();
        let b = ClassifierAdapter::new(model.as_ref(), &catalog).unwrap();

        let input = leaf_input([0, 0, 0]);
        assert_eq!(a.predict(&input).unwrap(), b.predict(&input).unwrap());
    }

    #[test]
    fn test_signature_accepts_config() {
        let sig = ModelSignature::leaf(3);
        assert!(sig.accepts(&PreprocessConfig::default()).is_ok());

        let rgb = PreprocessConfig {
            channel_order: ChannelOrder::Rgb,
            ..Default::default()
        };
        assert!(matches!(sig.accepts(&rgb), Err(ShapeError::ChannelOrder { .. })));

        let small = PreprocessConfig {
            size: 224,
            ..Default::default()
        };
        assert!(matches!(sig.accepts(&small), Err(ShapeError::InputShape { .. })));

        let float = PreprocessConfig {
            pixel_scale: PixelScale::UnitRange,
            ..Default::default()
        };
        assert!(matches!(sig.accepts(&float), Err(ShapeError::ElementType { .. })));
    }
}
