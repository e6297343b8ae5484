//! The ordered class catalog mapping model output indices to labels.
//!
//! Every label has the form `"<PlantType> - <DiseaseName>"`. The catalog's
//! order must match the model's output order exactly; [`ClassCatalog::ensure_width`]
//! is the check that length at least agrees.

use thiserror::Error;

/// Separator between the plant type and the disease name in a label.
pub const LABEL_SEPARATOR: &str = " - ";

/// Labels the bundled leaf model was trained with, in output order.
pub const DEFAULT_LABELS: [&str; 3] = [
    "Corn - Common Rust",
    "Potato - Early Blight",
    "Tomato - Bacterial Spot",
];

/// The classifier's output width and the catalog length disagree.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Catalog mismatch: {catalog_len} labels but classifier output has {output_width} scores")]
pub struct CatalogMismatchError {
    pub catalog_len: usize,
    pub output_width: usize,
}

/// A catalog entry does not contain exactly one separator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Malformed class label {label:?}: expected exactly one \" - \" separator, found {separators}")]
pub struct LabelFormatError {
    pub label: String,
    pub separators: usize,
}

/// A catalog entry split into its two parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassLabel<'a> {
    pub plant_type: &'a str,
    pub disease_name: &'a str,
}

impl<'a> ClassLabel<'a> {
    /// Split `"<Plant> - <Disease>"`.
    pub fn parse(label: &'a str) -> Result<Self, LabelFormatError> {
        let separators = label.matches(LABEL_SEPARATOR).count();
        match label.split_once(LABEL_SEPARATOR) {
            Some((plant_type, disease_name)) if separators == 1 => Ok(Self {
                plant_type,
                disease_name,
            }),
            _ => Err(LabelFormatError {
                label: label.to_string(),
                separators,
            }),
        }
    }
}

/// Immutable, ordered list of class labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassCatalog {
    labels: Vec<String>,
}

impl ClassCatalog {
    /// Build a catalog, validating every label up front.
    pub fn new<I, S>(labels: I) -> Result<Self, LabelFormatError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        for label in &labels {
            ClassLabel::parse(label)?;
        }
        Ok(Self { labels })
    }

    /// Build a catalog without validating labels.
    ///
    /// Malformed entries are then only reported when they win a prediction.
    pub fn new_unchecked<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Fail unless `output_width` equals the number of labels.
    ///
    /// An empty catalog never matches: there would be no class to report.
    pub fn ensure_width(&self, output_width: usize) -> Result<(), CatalogMismatchError> {
        if !self.labels.is_empty() && output_width == self.labels.len() {
            Ok(())
        } else {
            Err(CatalogMismatchError {
                catalog_len: self.labels.len(),
                output_width,
            })
        }
    }
}

impl Default for ClassCatalog {
    fn default() -> Self {
        Self::new_unchecked(DEFAULT_LABELS)
    }
}
