//! Action tags recorded in [`SanitizationReport::actions`](crate::SanitizationReport).
//!
//! Tags are plain strings so downstream log sinks can print them verbatim.
//! The parameterized ones are built by the helper functions below.

use crate::ImageFormat;

pub const EXIF_STRIPPED: &str = "EXIF_STRIPPED";
pub const EXIF_FLIP_H: &str = "EXIF_FLIP_H";
pub const EXIF_ROT_180: &str = "EXIF_ROT_180";
pub const EXIF_FLIP_V: &str = "EXIF_FLIP_V";
pub const EXIF_TRANSPOSE: &str = "EXIF_TRANSPOSE";
pub const EXIF_ROT_270: &str = "EXIF_ROT_270";
pub const EXIF_TRANSVERSE: &str = "EXIF_TRANSVERSE";
pub const EXIF_ROT_90: &str = "EXIF_ROT_90";
pub const FORCE_SRGB: &str = "FORCE_sRGB";
pub const ALPHA_FLAT_WHITE: &str = "ALPHA_FLAT_WHITE";
pub const CLEAN_BINARY: &str = "CLEAN_BINARY";
pub const INVALID_REPLACED: &str = "INVALID_REPLACED";
pub const DECODE_FAIL_REPLACED: &str = "DECODE_FAIL_REPLACED";
pub const REENCODE_FAILED: &str = "REENCODE_FAILED";
/// The placeholder could not be written; the original was removed instead.
pub const PLACEHOLDER_FAILED: &str = "PLACEHOLDER_FAILED";

/// `FORCE_{dpi}DPI`, recorded after a successful re-encode.
pub fn force_dpi(dpi: u32) -> String {
    format!("FORCE_{dpi}DPI")
}

/// `FAST_{dpi}DPI`, recorded when the fast path patched the file in place.
pub fn fast_dpi(dpi: u32) -> String {
    format!("FAST_{dpi}DPI")
}

/// `SPOOF_{claimed}→{real}` for an extension that lies about the content.
pub fn spoof(claimed: ImageFormat, real: ImageFormat) -> String {
    format!("SPOOF_{claimed}→{real}")
}

/// `RESIZE_{w}x{h}→{w'}x{h'}`.
pub fn resize(from: (u32, u32), to: (u32, u32)) -> String {
    format!("RESIZE_{}x{}→{}x{}", from.0, from.1, to.0, to.1)
}

/// Whether a tag is part of the normalization every clean file receives.
///
/// A report whose actions are all baseline keeps status `OK`.
pub fn is_baseline(tag: &str) -> bool {
    tag == EXIF_STRIPPED
        || tag == CLEAN_BINARY
        || is_dpi_tag(tag, "FORCE_")
        || is_dpi_tag(tag, "FAST_")
}

fn is_dpi_tag(tag: &str, prefix: &str) -> bool {
    tag.strip_prefix(prefix)
        .and_then(|rest| rest.strip_suffix("DPI"))
        .map(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
        .unwrap_or(false)
}
