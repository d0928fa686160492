//! Two-phase bounded decoding.
//!
//! Phase one reads only the header to learn the dimensions; nothing larger
//! than the header is allocated until [`DecodeLimits::check`] has accepted
//! them. Phase two re-opens the file and decodes with an allocation cap.

use std::path::Path;

use folioforge_common::ImageFormat;
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageError, ImageFormat as CodecFormat, ImageReader, Limits};
use tracing::debug;

use crate::DecodeError;

/// Longest side accepted by default.
pub const DEFAULT_MAX_DIMENSION: u32 = 50_000;
/// Largest pixel count accepted by default.
pub const DEFAULT_MAX_PIXELS: u64 = 500_000_000;
/// Largest decode allocation accepted by default (500 MiB).
pub const DEFAULT_MAX_DECOMPRESSED_BYTES: u64 = 500 * 1024 * 1024;

/// Resource bounds applied before and during decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    pub max_dimension: u32,
    pub max_pixels: u64,
    pub max_decompressed_bytes: u64,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_dimension: DEFAULT_MAX_DIMENSION,
            max_pixels: DEFAULT_MAX_PIXELS,
            max_decompressed_bytes: DEFAULT_MAX_DECOMPRESSED_BYTES,
        }
    }
}

impl DecodeLimits {
    /// Validate header dimensions.
    pub fn check(&self, width: u32, height: u32) -> Result<(), DecodeError> {
        if width == 0 || height == 0 {
            return Err(DecodeError::InvalidDimensions { width, height });
        }
        if width > self.max_dimension || height > self.max_dimension {
            return Err(DecodeError::DimensionExceeded {
                width,
                height,
                max: self.max_dimension,
            });
        }
        let pixels = u64::from(width) * u64::from(height);
        if pixels > self.max_pixels {
            return Err(DecodeError::PixelBombExceeded {
                pixels,
                max: self.max_pixels,
            });
        }
        Ok(())
    }

    fn codec_limits(&self) -> Limits {
        let mut limits = Limits::default();
        limits.max_alloc = Some(self.max_decompressed_bytes);
        limits.max_image_width = Some(self.max_dimension);
        limits.max_image_height = Some(self.max_dimension);
        limits
    }
}

/// Whether the decoded buffer carries an alpha channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelLayout {
    Alpha,
    Opaque,
}

/// A fully decoded image owned by one worker.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub image: DynamicImage,
    pub width: u32,
    pub height: u32,
    pub layout: PixelLayout,
}

impl DecodedImage {
    pub fn new(image: DynamicImage) -> Self {
        let layout = if image.color().has_alpha() {
            PixelLayout::Alpha
        } else {
            PixelLayout::Opaque
        };
        Self {
            width: image.width(),
            height: image.height(),
            image,
            layout,
        }
    }
}

/// Map a sniffed format onto the codec that decodes it.
pub fn codec_format(format: ImageFormat) -> CodecFormat {
    match format {
        ImageFormat::Jpeg => CodecFormat::Jpeg,
        ImageFormat::Png => CodecFormat::Png,
        ImageFormat::Gif => CodecFormat::Gif,
        ImageFormat::Webp => CodecFormat::WebP,
        ImageFormat::Bmp => CodecFormat::Bmp,
        ImageFormat::Tiff => CodecFormat::Tiff,
    }
}

/// Read header dimensions without decoding pixel data.
pub fn read_dimensions(path: &Path, format: ImageFormat) -> Result<(u32, u32), DecodeError> {
    let mut reader = ImageReader::open(path)?;
    reader.set_format(codec_format(format));
    reader.no_limits();
    reader.into_dimensions().map_err(|e| map_codec_error(e, u64::MAX))
}

/// Decode `path` as `format`, rejecting anything outside `limits`.
pub fn decode(
    path: &Path,
    format: ImageFormat,
    limits: &DecodeLimits,
) -> Result<DecodedImage, DecodeError> {
    let (width, height) = read_dimensions(path, format)?;
    limits.check(width, height)?;

    let file_len = std::fs::metadata(path)?.len();
    if file_len > limits.max_decompressed_bytes {
        return Err(DecodeError::DecompressedSizeExceeded {
            limit: limits.max_decompressed_bytes,
        });
    }

    let mut reader = ImageReader::open(path)?;
    reader.set_format(codec_format(format));
    reader.limits(limits.codec_limits());
    let image = reader
        .decode()
        .map_err(|e| map_codec_error(e, limits.max_decompressed_bytes))?;

    debug!(path = %path.display(), width, height, "decoded");
    Ok(DecodedImage::new(image))
}

fn map_codec_error(err: ImageError, limit: u64) -> DecodeError {
    match err {
        ImageError::Limits(_) => DecodeError::DecompressedSizeExceeded { limit },
        other => DecodeError::Decode(other.to_string()),
    }
}

/// EXIF orientation (1..=8) of the original file, if it can be read.
///
/// Formats without orientation metadata report 1.
pub fn read_orientation(path: &Path, format: ImageFormat) -> Option<u8> {
    let mut reader = ImageReader::open(path).ok()?;
    reader.set_format(codec_format(format));
    let mut decoder = reader.into_decoder().ok()?;
    let orientation = decoder.orientation().ok()?;
    Some(exif_value(orientation))
}

fn exif_value(orientation: Orientation) -> u8 {
    match orientation {
        Orientation::NoTransforms => 1,
        Orientation::FlipHorizontal => 2,
        Orientation::Rotate180 => 3,
        Orientation::FlipVertical => 4,
        Orientation::Rotate90FlipH => 5,
        Orientation::Rotate90 => 6,
        Orientation::Rotate270FlipH => 7,
        Orientation::Rotate270 => 8,
        #[allow(unreachable_patterns)]
        _ => 1,
    }
}
