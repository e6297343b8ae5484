//! Pipeline-level error type.

use thiserror::Error;

use crate::catalog::{CatalogMismatchError, LabelFormatError};
use crate::decode::DecodeError;
use crate::tensor::ShapeError;

/// Any failure that aborts a classification.
///
/// Each variant is a distinct signal for the presentation layer; none of them
/// is retried and none is turned into a placeholder result.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ClassifyError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Shape(#[from] ShapeError),

    #[error(transparent)]
    CatalogMismatch(#[from] CatalogMismatchError),

    #[error(transparent)]
    LabelFormat(#[from] LabelFormatError),

    /// The model artifact failed to load or to run.
    #[error("Model error: {0}")]
    Model(String),
}

impl ClassifyError {
    /// Stable name of the error kind, suitable for matching in UI code.
    pub fn kind(&self) -> &'static str {
        match self {
            ClassifyError::Decode(_) => "DecodeError",
            ClassifyError::Shape(_) => "ShapeError",
            ClassifyError::CatalogMismatch(_) => "CatalogMismatchError",
            ClassifyError::LabelFormat(_) => "LabelFormatError",
            ClassifyError::Model(_) => "ModelError",
        }
    }
}
