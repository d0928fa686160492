//! Core type definitions for sniffed formats and per-file outcomes.
//!
//! Both enums serialize to the same strings that appear in reports and logs:
//! formats in lowercase (`jpeg`, `png`, ...), statuses in uppercase
//! (`OK`, `REPAIRED`, ...).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Raster format identified from magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// JPEG / JFIF / EXIF.
    Jpeg,
    /// Portable Network Graphics.
    Png,
    /// GIF87a / GIF89a.
    Gif,
    /// RIFF WebP.
    Webp,
    /// Windows bitmap.
    Bmp,
    /// TIFF, either byte order.
    Tiff,
}

impl ImageFormat {
    /// Lowercase name used in reports and action tags.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::Webp => "webp",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            "gif" => Ok(Self::Gif),
            "webp" => Ok(Self::Webp),
            "bmp" => Ok(Self::Bmp),
            "tiff" | "tif" => Ok(Self::Tiff),
            other => Err(Error::UnknownFormat(other.to_string())),
        }
    }
}

/// Outcome of sanitizing one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SanitizeStatus {
    /// Only baseline metadata normalization was applied.
    Ok,
    /// Pixels or structure were corrected and re-encoded.
    Repaired,
    /// The file could not be decoded and was swapped for a placeholder.
    Replaced,
    /// The file was unrecognized or could not be rewritten. The original is removed.
    Failed,
}

impl SanitizeStatus {
    /// Whether the original binary was removed from the tree.
    pub fn is_substituted(&self) -> bool {
        matches!(self, Self::Replaced | Self::Failed)
    }
}

impl fmt::Display for SanitizeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::Repaired => write!(f, "REPAIRED"),
            Self::Replaced => write!(f, "REPLACED"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

impl FromStr for SanitizeStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OK" => Ok(Self::Ok),
            "REPAIRED" => Ok(Self::Repaired),
            "REPLACED" => Ok(Self::Replaced),
            "FAILED" => Ok(Self::Failed),
            other => Err(Error::UnknownStatus(other.to_string())),
        }
    }
}
