//! JPEG/PNG decoding with content sniffing and EXIF orientation handling.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::{DynamicImage, ImageReader};

use super::{DecodeError, ImageFormat, Orientation, PixelTensor, Upload};

/// Decode JPEG or PNG bytes into an RGB [`PixelTensor`].
///
/// The container format is detected from the content itself. EXIF orientation,
/// when present, is applied so the tensor is upright. Alpha is dropped and
/// grayscale sources are expanded to three channels.
///
/// # Errors
///
/// Returns `DecodeError::Empty` for empty input, `DecodeError::InvalidFormat`
/// or `DecodeError::UnsupportedFormat` when the content is not JPEG/PNG, and
/// `DecodeError::CorruptedFile` when the data is truncated or damaged.
pub fn decode(bytes: &[u8]) -> Result<PixelTensor, DecodeError> {
    let format = ImageFormat::detect(bytes)?;
    let orientation = extract_orientation(bytes);

    let img = ImageReader::with_format(Cursor::new(bytes), format.to_image_format())
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    let oriented = apply_orientation(img, orientation);
    let tensor = PixelTensor::from_rgb_image(oriented.into_rgb8());

    if tensor.is_empty() {
        return Err(DecodeError::CorruptedFile(format!(
            "decoded image has no pixels ({}x{})",
            tensor.width, tensor.height
        )));
    }

    log::debug!(
        "decoded {:?} image: {}x{} ({:?})",
        format,
        tensor.width,
        tensor.height,
        orientation
    );
    Ok(tensor)
}

/// Decode an upload, checking the asserted extension first.
///
/// Extensions outside {jpg, jpeg, png} are rejected. An accepted extension that
/// disagrees with the sniffed content is logged and otherwise ignored: the
/// content decides how the bytes are decoded.
pub fn decode_upload(upload: &Upload<'_>) -> Result<PixelTensor, DecodeError> {
    let claimed = ImageFormat::from_extension(upload.extension)
        .ok_or_else(|| DecodeError::UnsupportedExtension(upload.extension.to_string()))?;

    if let Ok(actual) = ImageFormat::detect(upload.bytes) {
        if actual != claimed {
            log::warn!(
                "upload claims .{} but content is {:?}; decoding by content",
                upload.extension,
                actual
            );
        }
    }

    decode(upload.bytes)
}

/// Extract EXIF orientation from the container.
///
/// Returns `Orientation::Normal` if no EXIF data is found or orientation
/// cannot be determined.
fn extract_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);

    match Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .map(Orientation::from)
            .unwrap_or_default(),
        Err(_) => Orientation::Normal,
    }
}

/// Apply EXIF orientation transformation to an image.
fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => img,
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::Rotate180 => img.rotate180(),
        Orientation::FlipVertical => img.flipv(),
        Orientation::Transpose => img.rotate90().fliph(),
        Orientation::Rotate90CW => img.rotate90(),
        Orientation::Transverse => img.rotate270().fliph(),
        Orientation::Rotate270CW => img.rotate270(),
    }
}
