//! Core types for image decoding.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error types for image decoding operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// No bytes were supplied.
    #[error("Image data is empty")]
    Empty,

    /// The content is not a recognizable image container.
    #[error("Invalid or unrecognized image format")]
    InvalidFormat,

    /// The content is a known image container that this pipeline does not accept.
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// The uploader asserted a file extension outside the accepted set.
    #[error("Unsupported file extension: {0:?} (expected jpg, jpeg or png)")]
    UnsupportedExtension(String),

    /// The image file is corrupted or incomplete.
    #[error("Corrupted or incomplete image file: {0}")]
    CorruptedFile(String),
}

/// Container formats accepted by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    /// Detect the container format from the leading bytes of the content.
    ///
    /// # Errors
    ///
    /// Returns `DecodeError::Empty` for empty input, `DecodeError::InvalidFormat`
    /// when no known signature matches, and `DecodeError::UnsupportedFormat` for
    /// recognized containers other than JPEG and PNG.
    pub fn detect(bytes: &[u8]) -> Result<Self, DecodeError> {
        if bytes.is_empty() {
            return Err(DecodeError::Empty);
        }

        match image::guess_format(bytes) {
            Ok(image::ImageFormat::Jpeg) => Ok(ImageFormat::Jpeg),
            Ok(image::ImageFormat::Png) => Ok(ImageFormat::Png),
            Ok(other) => Err(DecodeError::UnsupportedFormat(format!("{:?}", other))),
            Err(_) => Err(DecodeError::InvalidFormat),
        }
    }

    /// Map an asserted file extension (without the dot, any case) to a format.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "png" => Some(ImageFormat::Png),
            _ => None,
        }
    }

    /// Convert to the image crate's format enum.
    pub fn to_image_format(self) -> image::ImageFormat {
        match self {
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
            ImageFormat::Png => image::ImageFormat::Png,
        }
    }
}

/// Uploaded image bytes together with the extension the uploader claims.
///
/// The extension is only used to reject obviously wrong uploads; the actual
/// format always comes from the content.
#[derive(Debug, Clone, Copy)]
pub struct Upload<'a> {
    pub bytes: &'a [u8],
    pub extension: &'a str,
}

impl<'a> Upload<'a> {
    pub fn new(bytes: &'a [u8], extension: &'a str) -> Self {
        Self { bytes, extension }
    }
}

/// Order of the three colour components within each pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelOrder {
    /// Red, green, blue. This is what the decoder emits.
    #[default]
    Rgb,
    /// Blue, green, red.
    Bgr,
}

impl ChannelOrder {
    /// Returns true if converting between `self` and `other` swaps the first
    /// and last component of every pixel.
    #[inline]
    pub fn swaps_with(self, other: ChannelOrder) -> bool {
        self != other
    }
}

/// Filter type for image resizing operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    /// Nearest neighbor interpolation (fastest, lowest quality).
    Nearest,
    /// Bilinear interpolation (fast, acceptable quality).
    #[default]
    Bilinear,
    /// Lanczos3 interpolation (slower, highest quality).
    Lanczos3,
}

impl FilterType {
    /// Convert to the image crate's FilterType.
    pub fn to_image_filter(self) -> image::imageops::FilterType {
        match self {
            FilterType::Nearest => image::imageops::FilterType::Nearest,
            FilterType::Bilinear => image::imageops::FilterType::Triangle,
            FilterType::Lanczos3 => image::imageops::FilterType::Lanczos3,
        }
    }
}

/// EXIF orientation values (1-8).
/// See: https://exiftool.org/TagNames/EXIF.html
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Orientation {
    /// Normal (no transformation needed).
    #[default]
    Normal = 1,
    FlipHorizontal = 2,
    Rotate180 = 3,
    FlipVertical = 4,
    /// Transpose (flip horizontal + rotate 270 CW).
    Transpose = 5,
    Rotate90CW = 6,
    /// Transverse (flip horizontal + rotate 90 CW).
    Transverse = 7,
    Rotate270CW = 8,
}

impl From<u32> for Orientation {
    fn from(value: u32) -> Self {
        match value {
            2 => Orientation::FlipHorizontal,
            3 => Orientation::Rotate180,
            4 => Orientation::FlipVertical,
            5 => Orientation::Transpose,
            6 => Orientation::Rotate90CW,
            7 => Orientation::Transverse,
            8 => Orientation::Rotate270CW,
            _ => Orientation::Normal,
        }
    }
}

/// A `(height, width, 3)` array of 8-bit pixels with a known channel order.
///
/// Pixels are stored row-major, three bytes per pixel, in the order named by
/// `order`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelTensor {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Channel order of `pixels`.
    pub order: ChannelOrder,
    /// Pixel data. Length should be width * height * 3.
    pub pixels: Vec<u8>,
}

impl PixelTensor {
    /// Create a new PixelTensor with the given dimensions and pixel data.
    pub fn new(width: u32, height: u32, order: ChannelOrder, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            (width as usize) * (height as usize) * 3,
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            order,
            pixels,
        }
    }

    /// Create an RGB PixelTensor from an image::RgbImage.
    pub fn from_rgb_image(img: image::RgbImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            order: ChannelOrder::Rgb,
            pixels: img.into_raw(),
        }
    }

    /// View the buffer as an image::RgbImage container.
    ///
    /// The container type says "RGB" but the bytes keep `self.order`; this is
    /// only used for channel-agnostic operations such as resizing.
    pub(crate) fn to_image_buffer(&self) -> Option<image::RgbImage> {
        image::RgbImage::from_raw(self.width, self.height, self.pixels.clone())
    }

    /// Shape as `(height, width, channels)`.
    pub fn shape(&self) -> [usize; 3] {
        [self.height as usize, self.width as usize, 3]
    }

    /// Number of bytes the buffer should hold for the stated dimensions.
    pub fn expected_len(&self) -> usize {
        (self.width as usize) * (self.height as usize) * 3
    }

    /// Check if this is an empty/invalid image.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }

    /// Return a copy of this tensor laid out in `order`.
    pub fn to_order(&self, order: ChannelOrder) -> PixelTensor {
        let mut out = self.clone();
        out.reorder(order);
        out
    }

    /// Rewrite the buffer in place so its channels follow `order`.
    pub fn reorder(&mut self, order: ChannelOrder) {
        if self.order.swaps_with(order) {
            for px in self.pixels.chunks_exact_mut(3) {
                px.swap(0, 2);
            }
            self.order = order;
        }
    }
}
