//! WASM-compatible wrapper types for images, results and errors.
//!
//! This module provides JavaScript-friendly types that wrap the core Leafscan
//! types, handling the conversion between Rust and JavaScript representations.

use leafscan_core::{ChannelOrder, ClassificationResult, ClassifyError, PixelTensor};
use wasm_bindgen::prelude::*;

/// An RGB image for display.
///
/// # Memory Management
///
/// The pixel data is stored in WASM memory. When you call `pixels()`, a copy is made
/// to JavaScript memory as a `Uint8Array`.
#[wasm_bindgen]
pub struct JsPixelImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

#[wasm_bindgen]
impl JsPixelImage {
    /// Create a new JsPixelImage from dimensions and RGB pixel data
    /// (3 bytes per pixel, row-major order).
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> JsPixelImage {
        JsPixelImage {
            width,
            height,
            pixels,
        }
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of bytes in the pixel buffer (width * height * 3).
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.pixels.len()
    }

    /// Returns RGB pixel data as Uint8Array (a copy).
    pub fn pixels(&self) -> Vec<u8> {
        self.pixels.clone()
    }

    /// Returns RGBA pixel data with opaque alpha, ready for `ImageData`.
    pub fn rgba_pixels(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() / 3 * 4);
        for px in self.pixels.chunks_exact(3) {
            out.extend_from_slice(px);
            out.push(255);
        }
        out
    }
}

impl JsPixelImage {
    /// Wrap a core tensor, converting it to RGB if needed.
    pub(crate) fn from_tensor(mut img: PixelTensor) -> Self {
        img.reorder(ChannelOrder::Rgb);
        Self {
            width: img.width,
            height: img.height,
            pixels: img.pixels,
        }
    }

    /// Convert back to a core RGB tensor (clones the pixel data).
    pub(crate) fn to_tensor(&self) -> PixelTensor {
        PixelTensor {
            width: self.width,
            height: self.height,
            order: ChannelOrder::Rgb,
            pixels: self.pixels.clone(),
        }
    }
}

/// Classification outcome for JavaScript.
#[wasm_bindgen]
pub struct JsClassificationResult {
    inner: ClassificationResult,
}

#[wasm_bindgen]
impl JsClassificationResult {
    #[wasm_bindgen(getter)]
    pub fn plant_type(&self) -> String {
        self.inner.plant_type.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn disease_name(&self) -> String {
        self.inner.disease_name.clone()
    }

    /// Confidence in percent (0-100 for softmax output).
    #[wasm_bindgen(getter)]
    pub fn confidence_percent(&self) -> f32 {
        self.inner.confidence_percent
    }

    #[wasm_bindgen(getter)]
    pub fn class_index(&self) -> usize {
        self.inner.class_index
    }

    /// e.g. "Potato - Early Blight (70.00%)"
    pub fn summary(&self) -> String {
        self.inner.to_string()
    }
}

impl From<ClassificationResult> for JsClassificationResult {
    fn from(inner: ClassificationResult) -> Self {
        Self { inner }
    }
}

/// Convert a pipeline error into a JS `Error` whose `name` is the error kind
/// (`DecodeError`, `ShapeError`, `CatalogMismatchError`, `LabelFormatError`
/// or `ModelError`), so callers can branch on `err.name`.
pub(crate) fn to_js_error(err: ClassifyError) -> JsValue {
    let js_err = js_sys::Error::new(&err.to_string());
    js_err.set_name(err.kind());
    js_err.into()
}
