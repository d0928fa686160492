//! Decode-free DPI patch for JPEGs that need no pixel work.
//!
//! A JPEG with a JPEG extension and no orientation to bake in only needs its
//! JFIF density rewritten, which is done on the raw bytes. The density fields
//! come out byte-identical to what a full re-encode would write. Alpha is not
//! checked because JPEG has no alpha channel.

use std::path::Path;

use folioforge_common::{paths, ImageFormat};
use folioforge_image::{atomic_replace, dpi, EncodeError};

/// Whether `path` can skip decoding.
pub fn is_eligible(path: &Path, sniffed: ImageFormat, orientation: Option<u8>) -> bool {
    paths::is_jpeg_extension(path)
        && sniffed == ImageFormat::Jpeg
        && orientation.map_or(true, |o| o <= 1)
}

/// Patch the JFIF density in place. Returns the new file size.
pub fn apply(path: &Path, target_dpi: u32) -> Result<u64, EncodeError> {
    let raw = std::fs::read(path).map_err(|source| EncodeError::Replace {
        path: path.to_path_buf(),
        source,
    })?;
    let patched = dpi::inject_jfif_dpi(&raw, target_dpi);
    atomic_replace(path, &patched)
}
