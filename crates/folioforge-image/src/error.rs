//! Error types for each image stage.

use std::path::PathBuf;

/// Format sniffing failures.
#[derive(Debug, thiserror::Error)]
pub enum SniffError {
    /// None of the known signatures matched.
    #[error("unknown magic bytes: {}", hex(.magic))]
    Unknown { magic: Vec<u8> },

    /// Fewer than two bytes could be read.
    #[error("file too small to identify ({len} bytes)")]
    TooSmall { len: usize },

    /// The file could not be opened or read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Bounded decoding failures.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Header declares a zero width or height.
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// One side exceeds the configured maximum.
    #[error("monster image {width}x{height} exceeds {max}px per side")]
    DimensionExceeded { width: u32, height: u32, max: u32 },

    /// Total pixel count exceeds the configured maximum.
    #[error("pixel bomb: {pixels} pixels exceeds {max}")]
    PixelBombExceeded { pixels: u64, max: u64 },

    /// Decoding would need more memory than allowed.
    #[error("decompressed size exceeds {limit} bytes")]
    DecompressedSizeExceeded { limit: u64 },

    /// The codec rejected the data.
    #[error("decode failed: {0}")]
    Decode(String),
}

impl DecodeError {
    /// Whether the image was rejected by a resource bound rather than corrupt data.
    pub fn is_bomb(&self) -> bool {
        matches!(
            self,
            Self::DimensionExceeded { .. }
                | Self::PixelBombExceeded { .. }
                | Self::DecompressedSizeExceeded { .. }
        )
    }
}

/// Metadata patching failures.
#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    /// The input does not start with the PNG signature.
    #[error("not a PNG stream")]
    NotPng,

    /// Chunk structure is truncated or inconsistent.
    #[error("malformed PNG at offset {offset}: {reason}")]
    Malformed { offset: usize, reason: &'static str },
}

/// Re-encoding failures.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("encode failed: {0}")]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Patch(#[from] PatchError),

    /// Writing or renaming the temp file failed.
    #[error("failed to replace {}: {source}", path.display())]
    Replace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_magic_display() {
        let err = SniffError::Unknown {
            magic: vec![0x00, 0x01, 0xAB, 0xFF],
        };
        assert_eq!(err.to_string(), "unknown magic bytes: 00 01 AB FF");
    }

    #[test]
    fn test_is_bomb() {
        assert!(DecodeError::PixelBombExceeded { pixels: 1, max: 0 }.is_bomb());
        assert!(DecodeError::DecompressedSizeExceeded { limit: 1 }.is_bomb());
        assert!(!DecodeError::Decode("eof".into()).is_bomb());
        assert!(!DecodeError::InvalidDimensions { width: 0, height: 1 }.is_bomb());
    }
}
