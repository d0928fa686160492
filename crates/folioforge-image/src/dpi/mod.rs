//! Resolution metadata patching.
//!
//! Both patchers work on encoded bytes and touch only the density fields,
//! so they can run on a fresh encode or directly on an untouched original.

pub mod crc;
pub mod jpeg;
pub mod png;

pub use crc::crc32;
pub use jpeg::inject_jfif_dpi;
pub use png::inject_phys;

/// Resolution written when nothing else is configured.
pub const DEFAULT_TARGET_DPI: u32 = 96;

/// Pixels per metre for a dots-per-inch value, rounded to nearest.
///
/// ```
/// assert_eq!(folioforge_image::dpi::ppm_for_dpi(96), 3780);
/// assert_eq!(folioforge_image::dpi::ppm_for_dpi(300), 11811);
/// ```
pub fn ppm_for_dpi(dpi: u32) -> u32 {
    (f64::from(dpi) / 0.0254).round() as u32
}
