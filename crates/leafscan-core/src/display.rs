//! Display path: an RGB preview of the uploaded image.
//!
//! The preview is built from a borrowed `PixelTensor` and is only meant for
//! rendering. Nothing here produces an `InputTensor`.

use crate::decode::{self, ChannelOrder, FilterType, PixelTensor};
use crate::tensor::ShapeError;

/// Default longest edge of the on-screen preview.
pub const DEFAULT_PREVIEW_EDGE: u32 = 512;

/// Build an RGB copy of `image` that fits within `max_edge`, keeping aspect ratio.
pub fn display_preview(image: &PixelTensor, max_edge: u32) -> Result<PixelTensor, ShapeError> {
    let mut preview = decode::resize_to_fit(image, max_edge, FilterType::Bilinear)?;
    preview.reorder(ChannelOrder::Rgb);
    Ok(preview)
}
