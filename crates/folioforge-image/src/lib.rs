//! Folioforge-Image: defensive handling of raster images found in EPUBs.
//!
//! Every stage here works on a single file and never panics on hostile input:
//!
//! - [`sniff`]: identify the real format from magic bytes
//! - [`decode`]: two-phase decoding bounded by [`DecodeLimits`]
//! - [`normalize`]: EXIF rotation, RGBA conversion, alpha flattening, downscaling
//! - [`dpi`]: in-place JFIF / pHYs density patching with CRC-32 recomputation
//! - [`encode`]: re-encoding and atomic on-disk replacement
//! - [`placeholder`]: the SVG written in place of unusable images
//!
//! # Example
//!
//! ```
//! use folioforge_image::{dpi, sniff_bytes};
//! use folioforge_common::ImageFormat;
//!
//! let jpeg = [0xFF, 0xD8, 0xFF, 0xE0, 0, 0, 0, 0, 0, 0, 0, 0];
//! assert_eq!(sniff_bytes(&jpeg).unwrap(), ImageFormat::Jpeg);
//! assert_eq!(dpi::ppm_for_dpi(96), 3780);
//! ```

pub mod decode;
pub mod dpi;
pub mod encode;
pub mod error;
pub mod normalize;
pub mod placeholder;
pub mod sniff;

pub use decode::{decode, read_orientation, DecodeLimits, DecodedImage, PixelLayout};
pub use encode::{atomic_replace, encode, OutputKind};
pub use error::{DecodeError, EncodeError, PatchError, SniffError};
pub use normalize::{normalize, Normalized};
pub use placeholder::{is_placeholder, substitute, PLACEHOLDER_SVG};
pub use sniff::{detect_spoof, sniff, sniff_bytes};
