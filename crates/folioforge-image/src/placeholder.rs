//! Placeholder written in place of images that cannot be kept.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;

/// Fixed 400x300 SVG substituted for unusable images.
pub const PLACEHOLDER_SVG: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="400" height="300">
  <rect width="400" height="300" fill="#f8f8f8"/>
  <rect x="10" y="10" width="380" height="280" fill="none" stroke="#ddd" stroke-width="2" stroke-dasharray="8,4"/>
  <text x="200" y="140" text-anchor="middle" font-family="sans-serif" font-size="16" fill="#999">⚠️ 损坏图像已移除</text>
  <text x="200" y="165" text-anchor="middle" font-family="sans-serif" font-size="11" fill="#bbb">Corrupted Image Removed</text>
</svg>"##;

/// Path the placeholder for `path` is written to.
pub fn placeholder_path(path: &Path) -> PathBuf {
    path.with_extension("svg")
}

/// Write the placeholder beside `path` and delete the original.
pub fn substitute(path: &Path) -> io::Result<PathBuf> {
    let svg = placeholder_path(path);
    fs::write(&svg, PLACEHOLDER_SVG)?;
    if svg != path {
        if let Err(e) = fs::remove_file(path) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!(path = %path.display(), error = %e, "failed to remove original after substitution");
                return Err(e);
            }
        }
    }
    Ok(svg)
}

/// Whether `bytes` are exactly the placeholder.
pub fn is_placeholder(bytes: &[u8]) -> bool {
    bytes == PLACEHOLDER_SVG.as_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitute() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.jpg");
        fs::write(&path, b"garbage").unwrap();

        let svg = substitute(&path).unwrap();
        assert_eq!(svg, dir.path().join("broken.svg"));
        assert!(!path.exists());
        assert!(is_placeholder(&fs::read(&svg).unwrap()));
    }

    #[test]
    fn test_substitute_missing_original() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.png");
        let svg = substitute(&path).unwrap();
        assert!(svg.exists());
    }

    #[test]
    fn test_placeholder_content() {
        assert!(PLACEHOLDER_SVG.contains(r#"width="400" height="300""#));
        assert!(PLACEHOLDER_SVG.contains("#f8f8f8"));
        assert!(PLACEHOLDER_SVG.contains(r#"stroke-dasharray="8,4""#));
        assert!(PLACEHOLDER_SVG.contains("Corrupted Image Removed"));
        assert!(!is_placeholder(b"<svg/>"));
    }
}
