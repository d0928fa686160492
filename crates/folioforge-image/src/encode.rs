//! Re-encoding and atomic replacement of files on disk.

use std::io::Write;
use std::path::Path;

use folioforge_common::paths;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, RgbaImage};
use tempfile::NamedTempFile;

use crate::{dpi, EncodeError};

/// Default JPEG quality.
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Container the normalized pixels are written back as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Jpeg,
    Png,
}

impl OutputKind {
    /// PNG for `.png` paths, JPEG for everything else.
    ///
    /// The file keeps its name, so references from the book's XHTML stay valid.
    pub fn for_path(path: &Path) -> Self {
        if paths::is_png_extension(path) {
            Self::Png
        } else {
            Self::Jpeg
        }
    }
}

/// Encode `img` and stamp `dpi` into its density metadata.
pub fn encode(
    img: &RgbaImage,
    kind: OutputKind,
    dpi: u32,
    jpeg_quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    let mut buf = Vec::new();
    match kind {
        OutputKind::Jpeg => {
            // JPEG has no alpha channel; the encoder rejects RGBA input.
            let rgb = DynamicImage::ImageRgba8(img.clone()).to_rgb8();
            rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, jpeg_quality))?;
            Ok(dpi::inject_jfif_dpi(&buf, dpi))
        }
        OutputKind::Png => {
            img.write_with_encoder(PngEncoder::new(&mut buf))?;
            Ok(dpi::inject_phys(&buf, dpi)?)
        }
    }
}

/// Replace `path` with `bytes` through a sibling temp file and a rename.
///
/// The replacement keeps the original's permissions. Returns the number of
/// bytes written. On failure the original is untouched.
pub fn atomic_replace(path: &Path, bytes: &[u8]) -> Result<u64, EncodeError> {
    let replace_err = |source| EncodeError::Replace {
        path: path.to_path_buf(),
        source,
    };
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = NamedTempFile::new_in(dir).map_err(replace_err)?;
    tmp.write_all(bytes).map_err(replace_err)?;
    if let Ok(meta) = std::fs::metadata(path) {
        tmp.as_file()
            .set_permissions(meta.permissions())
            .map_err(replace_err)?;
    }
    tmp.as_file().sync_all().map_err(replace_err)?;
    tmp.persist(path).map_err(|e| replace_err(e.error))?;
    Ok(bytes.len() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dpi::{jpeg::read_jfif_density, png::read_phys};
    use image::Rgba;

    #[test]
    fn test_output_kind() {
        assert_eq!(OutputKind::for_path(Path::new("a.PNG")), OutputKind::Png);
        assert_eq!(OutputKind::for_path(Path::new("a.jpg")), OutputKind::Jpeg);
        assert_eq!(OutputKind::for_path(Path::new("a.gif")), OutputKind::Jpeg);
        assert_eq!(OutputKind::for_path(Path::new("a.webp")), OutputKind::Jpeg);
    }

    #[test]
    fn test_encode_jpeg_has_dpi() {
        let img = RgbaImage::from_pixel(16, 16, Rgba([200, 100, 50, 255]));
        let bytes = encode(&img, OutputKind::Jpeg, 96, DEFAULT_JPEG_QUALITY).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        assert_eq!(read_jfif_density(&bytes), Some((1, 96, 96)));
        image::load_from_memory(&bytes).unwrap();
    }

    #[test]
    fn test_encode_png_has_phys() {
        let img = RgbaImage::from_pixel(16, 16, Rgba([200, 100, 50, 255]));
        let bytes = encode(&img, OutputKind::Png, 96, DEFAULT_JPEG_QUALITY).unwrap();
        assert_eq!(read_phys(&bytes), Some((3780, 3780, 1)));
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.width(), 16);
    }

    #[test]
    fn test_atomic_replace() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.png");
        std::fs::write(&path, b"old").unwrap();

        let written = atomic_replace(&path, b"new contents").unwrap();
        assert_eq!(written, 12);
        assert_eq!(std::fs::read(&path).unwrap(), b"new contents");

        // No temp files left behind
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_atomic_replace_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.jpg");
        std::fs::write(&path, b"old").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        atomic_replace(&path, b"new").unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[test]
    fn test_atomic_replace_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone").join("a.png");
        assert!(matches!(
            atomic_replace(&path, b"x"),
            Err(EncodeError::Replace { .. })
        ));
    }
}
