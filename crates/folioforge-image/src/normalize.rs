//! Pixel normalization steps, applied in a fixed order.
//!
//! 1. [`exif_rotate`] bakes the EXIF orientation into the pixels
//! 2. [`to_rgba`] converts every layout to 8-bit RGBA
//! 3. [`flatten_alpha`] composites translucent images over white
//! 4. [`resize_long_side`] downsamples oversized images

use folioforge_common::actions;
use image::imageops::FilterType;
use image::{DynamicImage, RgbaImage};

use crate::{DecodedImage, PixelLayout};

/// Images up to this many pixels have every alpha value inspected.
const FULL_ALPHA_SCAN_PIXELS: u64 = 1_000_000;
/// Sampling stride on both axes for larger images.
const ALPHA_SAMPLE_STRIDE: usize = 10;

/// Default cap on the longer side.
pub const DEFAULT_MAX_LONG_SIDE: u32 = 2500;

/// Apply the EXIF orientation, returning the action tag describing it.
///
/// Orientation 1, missing, or out of range leaves the pixels untouched.
pub fn exif_rotate(img: DynamicImage, orientation: Option<u8>) -> (DynamicImage, &'static str) {
    match orientation.unwrap_or(1) {
        2 => (img.fliph(), actions::EXIF_FLIP_H),
        3 => (img.rotate180(), actions::EXIF_ROT_180),
        4 => (img.flipv(), actions::EXIF_FLIP_V),
        5 => (img.rotate90().fliph(), actions::EXIF_TRANSPOSE),
        6 => (img.rotate90(), actions::EXIF_ROT_270),
        7 => (img.rotate270().fliph(), actions::EXIF_TRANSVERSE),
        8 => (img.rotate270(), actions::EXIF_ROT_90),
        _ => (img, actions::EXIF_STRIPPED),
    }
}

/// Convert to 8-bit RGBA. The flag is set when a conversion happened.
pub fn to_rgba(img: DynamicImage) -> (RgbaImage, bool) {
    match img {
        DynamicImage::ImageRgba8(buf) => (buf, false),
        other => (other.to_rgba8(), true),
    }
}

/// Whether any sampled pixel is not fully opaque.
pub fn has_translucency(buf: &RgbaImage) -> bool {
    let (w, h) = buf.dimensions();
    if u64::from(w) * u64::from(h) <= FULL_ALPHA_SCAN_PIXELS {
        return buf.pixels().any(|p| p[3] < 255);
    }
    (0..h)
        .step_by(ALPHA_SAMPLE_STRIDE)
        .flat_map(|y| (0..w).step_by(ALPHA_SAMPLE_STRIDE).map(move |x| (x, y)))
        .any(|(x, y)| buf.get_pixel(x, y)[3] < 255)
}

/// Composite over opaque white if any sampled pixel is translucent.
///
/// Returns whether the buffer was changed.
pub fn flatten_alpha(buf: &mut RgbaImage) -> bool {
    if !has_translucency(buf) {
        return false;
    }
    for pixel in buf.pixels_mut() {
        let alpha = u32::from(pixel[3]);
        for channel in &mut pixel.0[..3] {
            let c = u32::from(*channel);
            *channel = ((c * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        }
        pixel[3] = 255;
    }
    true
}

/// Target size keeping aspect ratio so the longer side equals `cap`.
pub fn fit_long_side(width: u32, height: u32, cap: u32) -> Option<(u32, u32)> {
    let long = width.max(height);
    if long <= cap {
        return None;
    }
    let scale = f64::from(cap) / f64::from(long);
    let w = ((f64::from(width) * scale).round() as u32).max(1);
    let h = ((f64::from(height) * scale).round() as u32).max(1);
    Some((w, h))
}

/// Downsample with Lanczos3 if the longer side exceeds `cap`.
pub fn resize_long_side(buf: RgbaImage, cap: u32) -> (RgbaImage, Option<String>) {
    let (width, height) = buf.dimensions();
    match fit_long_side(width, height, cap) {
        Some((w, h)) => {
            let resized = image::imageops::resize(&buf, w, h, FilterType::Lanczos3);
            (resized, Some(actions::resize((width, height), (w, h))))
        }
        None => (buf, None),
    }
}

/// Result of running every normalization step.
#[derive(Debug, Clone)]
pub struct Normalized {
    pub image: RgbaImage,
    pub actions: Vec<String>,
}

/// Run the four steps in order, collecting action tags.
pub fn normalize(decoded: DecodedImage, orientation: Option<u8>, max_long_side: u32) -> Normalized {
    let mut tags = Vec::new();
    let layout = decoded.layout;

    let (rotated, tag) = exif_rotate(decoded.image, orientation);
    tags.push(tag.to_string());

    let (mut buf, converted) = to_rgba(rotated);
    if converted {
        tags.push(actions::FORCE_SRGB.to_string());
    }

    if layout == PixelLayout::Alpha && flatten_alpha(&mut buf) {
        tags.push(actions::ALPHA_FLAT_WHITE.to_string());
    }

    let (image, resized) = resize_long_side(buf, max_long_side);
    tags.extend(resized);

    Normalized {
        image,
        actions: tags,
    }
}
