//! Path utilities for detecting image files by extension.
//!
//! The extension only decides which files are *visited*; the format actually
//! used for decoding always comes from the magic bytes. [`expected_format`]
//! provides the extension→format table used to flag spoofed extensions.

use std::path::Path;

use crate::ImageFormat;

/// List of image file extensions picked up during discovery.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "tif", "tiff", "webp"];

/// Lowercased extension of a path, if it has a UTF-8 one.
pub fn lowercase_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// Check if a path has an image file extension.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use folioforge_common::paths::is_image_file;
///
/// assert!(is_image_file(Path::new("cover.jpg")));
/// assert!(is_image_file(Path::new("/OEBPS/Images/fig.TIFF")));
/// assert!(!is_image_file(Path::new("chapter1.xhtml")));
/// ```
pub fn is_image_file(path: &Path) -> bool {
    lowercase_extension(path)
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Check if a path carries a JPEG extension (`.jpg` / `.jpeg`).
pub fn is_jpeg_extension(path: &Path) -> bool {
    matches!(lowercase_extension(path).as_deref(), Some("jpg" | "jpeg"))
}

/// Check if a path carries a `.png` extension.
pub fn is_png_extension(path: &Path) -> bool {
    matches!(lowercase_extension(path).as_deref(), Some("png"))
}

/// Format a file's extension claims it is, if the extension is recognized.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use folioforge_common::{paths::expected_format, ImageFormat};
///
/// assert_eq!(expected_format(Path::new("a.JPEG")), Some(ImageFormat::Jpeg));
/// assert_eq!(expected_format(Path::new("a.svg")), None);
/// ```
pub fn expected_format(path: &Path) -> Option<ImageFormat> {
    match lowercase_extension(path)?.as_str() {
        "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
        "png" => Some(ImageFormat::Png),
        "gif" => Some(ImageFormat::Gif),
        "bmp" => Some(ImageFormat::Bmp),
        "tif" | "tiff" => Some(ImageFormat::Tiff),
        "webp" => Some(ImageFormat::Webp),
        _ => None,
    }
}

/// Render `path` relative to `root` with forward slashes.
///
/// Falls back to the full path when `path` is not under `root`.
pub fn to_slash_relative(path: &Path, root: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
