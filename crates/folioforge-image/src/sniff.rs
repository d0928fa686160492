//! Format detection from magic bytes.
//!
//! The extension of a file inside an EPUB is untrusted; only the first twelve
//! bytes decide which decoder sees the data.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use folioforge_common::{actions, paths, ImageFormat};

use crate::SniffError;

/// Number of header bytes inspected.
pub const MAGIC_LEN: usize = 12;

/// Detect the format of a file from its magic bytes.
pub fn sniff(path: &Path) -> Result<ImageFormat, SniffError> {
    let file = File::open(path)?;
    let mut magic = Vec::with_capacity(MAGIC_LEN);
    file.take(MAGIC_LEN as u64).read_to_end(&mut magic)?;
    sniff_bytes(&magic)
}

/// Detect the format of an in-memory header.
///
/// Only the first [`MAGIC_LEN`] bytes are considered.
pub fn sniff_bytes(bytes: &[u8]) -> Result<ImageFormat, SniffError> {
    let magic = &bytes[..bytes.len().min(MAGIC_LEN)];
    if magic.len() < 2 {
        return Err(SniffError::TooSmall { len: magic.len() });
    }

    if magic.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Ok(ImageFormat::Jpeg);
    }
    if magic.len() >= 8 && magic[0] == 0x89 && &magic[1..4] == b"PNG" {
        return Ok(ImageFormat::Png);
    }
    if magic.starts_with(b"GIF87a") || magic.starts_with(b"GIF89a") {
        return Ok(ImageFormat::Gif);
    }
    if magic.len() >= 12 && &magic[0..4] == b"RIFF" && &magic[8..12] == b"WEBP" {
        return Ok(ImageFormat::Webp);
    }
    if magic.starts_with(b"BM") {
        return Ok(ImageFormat::Bmp);
    }
    // "II*\0" little-endian, "MM\0*" big-endian
    if magic.starts_with(&[0x49, 0x49, 0x2A, 0x00]) || magic.starts_with(&[0x4D, 0x4D, 0x00, 0x2A])
    {
        return Ok(ImageFormat::Tiff);
    }

    Err(SniffError::Unknown {
        magic: magic[..magic.len().min(4)].to_vec(),
    })
}

/// Compare a sniffed format against what the file extension claims.
///
/// Returns the `SPOOF_{ext}→{real}` action tag when they disagree. Unknown
/// extensions never count as spoofed.
pub fn detect_spoof(path: &Path, sniffed: ImageFormat) -> Option<String> {
    let claimed = paths::expected_format(path)?;
    (claimed != sniffed).then(|| actions::spoof(claimed, sniffed))
}
