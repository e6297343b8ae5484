//! Image decoding and preview bindings.
//!
//! These cover the display half of the page: turning an upload into an RGB
//! image that can be painted on a canvas. Classification has its own entry
//! point in [`crate::classify`].
//!
//! # Example
//!
//! ```typescript
//! import { decode_image, preview_image } from '@leafscan/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const image = decode_image(bytes, file.name.split('.').pop());
//! const preview = preview_image(image, 512);
//! ctx.putImageData(new ImageData(
//!   new Uint8ClampedArray(preview.rgba_pixels()), preview.width, preview.height), 0, 0);
//! ```

use crate::types::{to_js_error, JsPixelImage};
use leafscan_core::decode::{self, ImageFormat, Upload};
use leafscan_core::display;
use wasm_bindgen::prelude::*;

/// Decode an uploaded JPEG or PNG into RGB pixels.
///
/// `extension` is the file extension the upload claims (`"jpg"`, `"jpeg"` or
/// `"png"`, case-insensitive). EXIF orientation is applied.
///
/// # Errors
///
/// Throws an `Error` named `DecodeError` if the extension is not accepted or
/// the bytes are empty, unrecognized or corrupt.
#[wasm_bindgen]
pub fn decode_image(bytes: &[u8], extension: &str) -> Result<JsPixelImage, JsValue> {
    decode::decode_upload(&Upload::new(bytes, extension))
        .map(JsPixelImage::from_tensor)
        .map_err(|e| to_js_error(e.into()))
}

/// Scale an image to fit within `max_edge` for display, preserving aspect ratio.
///
/// Images already inside the bound are returned at their original size.
///
/// # Errors
///
/// Throws an `Error` named `ShapeError` if the image has no pixels.
#[wasm_bindgen]
pub fn preview_image(image: &JsPixelImage, max_edge: u32) -> Result<JsPixelImage, JsValue> {
    display::display_preview(&image.to_tensor(), max_edge)
        .map(JsPixelImage::from_tensor)
        .map_err(|e| to_js_error(e.into()))
}

/// Sniff the container format of `bytes`.
///
/// Returns `"jpeg"`, `"png"`, or `undefined` when the content is neither.
#[wasm_bindgen]
pub fn detect_format(bytes: &[u8]) -> Option<String> {
    match ImageFormat::detect(bytes).ok()? {
        ImageFormat::Jpeg => Some("jpeg".to_string()),
        ImageFormat::Png => Some("png".to_string()),
    }
}

/// Whether `extension` names a format the decoder accepts.
#[wasm_bindgen]
pub fn is_supported_extension(extension: &str) -> bool {
    ImageFormat::from_extension(extension).is_some()
}
