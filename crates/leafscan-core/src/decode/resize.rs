//! Resizing for model input (exact stretch) and display previews (fit).
//!
//! Both functions return new `PixelTensor` instances without modifying the
//! input, and both keep the source channel order.

use super::{FilterType, PixelTensor};
use crate::tensor::ShapeError;

/// Resize an image to exact dimensions, ignoring aspect ratio.
///
/// # Errors
///
/// Returns `ShapeError::EmptyImage` if the source or the target has a zero
/// dimension, and `ShapeError::BufferLength` if the source buffer does not
/// match its stated dimensions.
pub fn resize(
    image: &PixelTensor,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<PixelTensor, ShapeError> {
    if width == 0 || height == 0 {
        return Err(ShapeError::EmptyImage { width, height });
    }
    validate_source(image)?;

    // Fast path: if dimensions match, just clone
    if image.width == width && image.height == height {
        return Ok(image.clone());
    }

    let buffer = image.to_image_buffer().ok_or(ShapeError::BufferLength {
        expected: image.expected_len(),
        actual: image.pixels.len(),
    })?;

    let resized = image::imageops::resize(&buffer, width, height, filter.to_image_filter());

    Ok(PixelTensor::new(width, height, image.order, resized.into_raw()))
}

/// Resize an image to fit within a maximum edge length while preserving aspect ratio.
///
/// If the image is already smaller than `max_edge`, it is returned unchanged.
pub fn resize_to_fit(
    image: &PixelTensor,
    max_edge: u32,
    filter: FilterType,
) -> Result<PixelTensor, ShapeError> {
    if max_edge == 0 {
        return Err(ShapeError::EmptyImage {
            width: max_edge,
            height: max_edge,
        });
    }
    validate_source(image)?;

    if image.width <= max_edge && image.height <= max_edge {
        return Ok(image.clone());
    }

    let (new_width, new_height) = calculate_fit_dimensions(image.width, image.height, max_edge);

    resize(image, new_width, new_height, filter)
}

fn validate_source(image: &PixelTensor) -> Result<(), ShapeError> {
    if image.width == 0 || image.height == 0 {
        return Err(ShapeError::EmptyImage {
            width: image.width,
            height: image.height,
        });
    }
    if image.pixels.len() != image.expected_len() {
        return Err(ShapeError::BufferLength {
            expected: image.expected_len(),
            actual: image.pixels.len(),
        });
    }
    Ok(())
}

/// Calculate dimensions to fit within max_edge while preserving aspect ratio.
fn calculate_fit_dimensions(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (0, 0);
    }

    let ratio = width as f64 / height as f64;

    if width >= height {
        let new_height = (max_edge as f64 / ratio).round() as u32;
        (max_edge, new_height.max(1))
    } else {
        let new_width = (max_edge as f64 * ratio).round() as u32;
        (new_width.max(1), max_edge)
    }
}
