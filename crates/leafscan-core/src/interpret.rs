//! Turns classifier scores into a labelled, confidence-scored result.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::{ClassCatalog, ClassLabel};
use crate::error::ClassifyError;
use crate::tensor::ProbabilityVector;

/// Outcome of one classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub plant_type: String,
    pub disease_name: String,
    /// `100 * max(score)`; in 0..=100 whenever scores are in 0..=1.
    pub confidence_percent: f32,
    /// Winning catalog index.
    pub class_index: usize,
}

impl fmt::Display for ClassificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} ({:.2}%)",
            self.plant_type, self.disease_name, self.confidence_percent
        )
    }
}

/// Pick the winning class and split its label.
///
/// The highest score wins, ties going to the lowest index. The confidence is
/// that score times 100, with no renormalization of the vector.
///
/// # Errors
///
/// - `CatalogMismatch` if `probs` and `catalog` differ in length
/// - `LabelFormat` if the winning label lacks exactly one `" - "`
/// - `Model` if no score is a number (all NaN)
pub fn interpret(
    probs: &ProbabilityVector,
    catalog: &ClassCatalog,
) -> Result<ClassificationResult, ClassifyError> {
    catalog.ensure_width(probs.len())?;

    let (class_index, score) = probs
        .argmax()
        .ok_or_else(|| ClassifyError::Model("classifier returned no comparable scores".into()))?;

    // ensure_width guarantees the index is in range
    let label = catalog.get(class_index).unwrap_or_default();
    let ClassLabel {
        plant_type,
        disease_name,
    } = ClassLabel::parse(label)?;

    Ok(ClassificationResult {
        plant_type: plant_type.to_string(),
        disease_name: disease_name.to_string(),
        confidence_percent: score * 100.0,
        class_index,
    })
}
