//! Leafscan WASM - WebAssembly bindings for Leafscan
//!
//! This crate exposes the leafscan-core pipeline to a browser front end.
//!
//! # Module Structure
//!
//! - `types` - JS wrapper types for images, results and errors
//! - `decode` - Upload decoding and display previews
//! - `classify` - [`LeafScanner`], the classifier over a JS-hosted model
//!
//! # Usage
//!
//! ```typescript
//! import init, { decode_image, LeafScanner } from '@leafscan/wasm';
//!
//! await init();
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const image = decode_image(bytes, 'jpg');
//! const scanner = new LeafScanner(loadModel);
//! const result = scanner.classify_image(image);
//! console.log(`${result.plant_type}: ${result.disease_name}`);
//! ```

use wasm_bindgen::prelude::*;

mod classify;
mod decode;
mod types;

pub use classify::LeafScanner;
pub use decode::{decode_image, detect_format, is_supported_extension, preview_image};
pub use types::{JsClassificationResult, JsPixelImage};

/// Initialize the WASM module (called automatically on load).
///
/// Routes `log` output from the pipeline to the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    wasm_logger::init(wasm_logger::Config::new(log::Level::Info));
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Labels of the stock three-class leaf model, in output order.
#[wasm_bindgen]
pub fn default_labels() -> Vec<String> {
    leafscan_core::catalog::DEFAULT_LABELS
        .iter()
        .map(|s| s.to_string())
        .collect()
}
