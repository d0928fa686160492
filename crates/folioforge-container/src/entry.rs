//! Write plan for an OCF archive.

use std::path::PathBuf;

/// Name of the OCF media-type entry.
pub const MIMETYPE: &str = "mimetype";

/// Media type written when the source tree has no `mimetype` file.
pub const EPUB_MIMETYPE: &str = "application/epub+zip";

/// Compression method for one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Store,
    Deflate,
}

impl Compression {
    pub(crate) fn method(self) -> zip::CompressionMethod {
        match self {
            Self::Store => zip::CompressionMethod::Stored,
            Self::Deflate => zip::CompressionMethod::Deflated,
        }
    }
}

/// Where an entry's bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntrySource {
    /// Inline payload (used for the trimmed `mimetype`).
    Bytes(Vec<u8>),
    /// File streamed from disk.
    File(PathBuf),
}

/// One entry of the archive to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerEntry {
    /// Forward-slash path inside the archive.
    pub relative_path: String,
    pub source: EntrySource,
    pub compression: Compression,
}

impl ContainerEntry {
    /// The `mimetype` entry with surrounding whitespace removed.
    pub fn mimetype(raw: &[u8]) -> Self {
        Self {
            relative_path: MIMETYPE.to_string(),
            source: EntrySource::Bytes(trim_ascii(raw).to_vec()),
            compression: Compression::Store,
        }
    }

    pub fn file(relative_path: String, path: PathBuf) -> Self {
        Self {
            relative_path,
            source: EntrySource::File(path),
            compression: Compression::Deflate,
        }
    }

    pub fn is_mimetype(&self) -> bool {
        self.relative_path == MIMETYPE
    }
}

fn trim_ascii(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |i| i + 1);
    &bytes[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mimetype_trimmed() {
        let entry = ContainerEntry::mimetype(b"application/epub+zip\r\n");
        assert!(entry.is_mimetype());
        assert_eq!(entry.compression, Compression::Store);
        assert_eq!(entry.source, EntrySource::Bytes(EPUB_MIMETYPE.as_bytes().to_vec()));
    }

    #[test]
    fn test_trim_ascii() {
        assert_eq!(trim_ascii(b"  x y \n"), b"x y");
        assert_eq!(trim_ascii(b" \t\n"), b"");
        assert_eq!(trim_ascii(b""), b"");
    }
}
