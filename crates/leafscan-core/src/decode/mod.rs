//! Image decoding for the classification pipeline.
//!
//! This module provides functionality for:
//! - Sniffing the container format from content (JPEG and PNG are accepted)
//! - Decoding to an RGB `PixelTensor`, with EXIF orientation applied
//! - Validating an upload's asserted extension against its content
//! - Resizing, both exact (model input) and aspect-preserving (display)
//!
//! # Channel order
//!
//! The decoder always emits [`ChannelOrder::Rgb`]. Anything that needs a
//! different order (the classifier input, for instance) reorders a copy.
//!
//! # Examples
//!
//! ```ignore
//! use leafscan_core::decode::{decode, Upload, decode_upload};
//!
//! let bytes = std::fs::read("leaf.jpg").unwrap();
//! let image = decode_upload(&Upload::new(&bytes, "jpg")).unwrap();
//! println!("Decoded {}x{} image", image.width, image.height);
//! ```

mod reader;
mod resize;
mod types;

pub use reader::{decode, decode_upload};
pub use resize::{resize, resize_to_fit};
pub use types::{
    ChannelOrder, DecodeError, FilterType, ImageFormat, Orientation, PixelTensor, Upload,
};
