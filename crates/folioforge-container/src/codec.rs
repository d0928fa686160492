//! Streaming extraction and strict repacking.

use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

use folioforge_common::paths::to_slash_relative;
use tracing::{debug, info, warn};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::entry::{ContainerEntry, EntrySource, EPUB_MIMETYPE, MIMETYPE};
use crate::safe_path::resolve_entry;
use crate::{ContainerError, Result};

/// Default copy buffer (64 KiB).
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Outcome of [`unzip`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    pub files: usize,
    pub directories: usize,
    pub bytes: u64,
    /// Entry names refused because they resolve outside the destination.
    pub skipped: Vec<String>,
}

/// Outcome of [`zip_strict`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackSummary {
    /// Entries written, `mimetype` included.
    pub entries: usize,
    pub bytes: u64,
    /// Whether the `mimetype` payload came from the source tree.
    pub mimetype_from_source: bool,
}

/// Container operations with a configurable copy buffer.
#[derive(Debug, Clone, Copy)]
pub struct ContainerCodec {
    buffer_size: usize,
}

impl Default for ContainerCodec {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_SIZE)
    }
}

impl ContainerCodec {
    pub fn new(buffer_size: usize) -> Self {
        Self {
            buffer_size: buffer_size.max(1),
        }
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Extract `archive` into `dest`, skipping entries that would escape it.
    pub fn unzip(&self, archive: &Path, dest: &Path) -> Result<ExtractSummary> {
        let file = File::open(archive).map_err(|e| ContainerError::io(archive, e))?;
        let mut zip = ZipArchive::new(io::BufReader::new(file))?;
        fs::create_dir_all(dest).map_err(|e| ContainerError::io(dest, e))?;

        let mut summary = ExtractSummary::default();
        let mut buf = vec![0u8; self.buffer_size];

        for index in 0..zip.len() {
            let mut entry = zip.by_index(index)?;
            let name = entry.name().to_string();

            let Some(target) = resolve_entry(dest, &name) else {
                warn!(entry = %name, "skipping zip-slip entry");
                summary.skipped.push(name);
                continue;
            };

            if entry.is_dir() {
                fs::create_dir_all(&target).map_err(|e| ContainerError::io(&target, e))?;
                summary.directories += 1;
                continue;
            }

            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| ContainerError::io(parent, e))?;
            }
            let out = File::create(&target).map_err(|e| ContainerError::io(&target, e))?;
            let mut out = BufWriter::new(out);
            let written = copy_buffered(&mut entry, &mut out, &mut buf)
                .map_err(|e| ContainerError::io(&target, e))?;
            out.flush().map_err(|e| ContainerError::io(&target, e))?;

            summary.files += 1;
            summary.bytes += written;
        }

        info!(
            archive = %archive.display(),
            files = summary.files,
            skipped = summary.skipped.len(),
            "extracted"
        );
        Ok(summary)
    }

    /// Entries [`zip_strict`](Self::zip_strict) would write, in order.
    pub fn entries(&self, src: &Path) -> Result<Vec<ContainerEntry>> {
        if !src.is_dir() {
            return Err(ContainerError::NotADirectory(src.to_path_buf()));
        }

        let mimetype_path = src.join(MIMETYPE);
        let mimetype = match fs::read(&mimetype_path) {
            Ok(raw) => ContainerEntry::mimetype(&raw),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(src = %src.display(), "no mimetype file; writing {EPUB_MIMETYPE}");
                ContainerEntry::mimetype(EPUB_MIMETYPE.as_bytes())
            }
            Err(e) => return Err(ContainerError::io(&mimetype_path, e)),
        };

        let mut plan = vec![mimetype];
        for entry in WalkDir::new(src).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() || entry.path() == mimetype_path {
                continue;
            }
            let relative = to_slash_relative(entry.path(), src);
            plan.push(ContainerEntry::file(relative, entry.into_path()));
        }
        Ok(plan)
    }

    /// Pack `src` into `dest_file` with `mimetype` first and stored.
    pub fn zip_strict(&self, src: &Path, dest_file: &Path) -> Result<PackSummary> {
        let plan = self.entries(src)?;
        let mimetype_from_source = src.join(MIMETYPE).is_file();

        let file = File::create(dest_file).map_err(|e| ContainerError::io(dest_file, e))?;
        let mut zip = ZipWriter::new(BufWriter::new(file));
        let mut buf = vec![0u8; self.buffer_size];
        let mut summary = PackSummary {
            mimetype_from_source,
            ..PackSummary::default()
        };

        for entry in &plan {
            let options = SimpleFileOptions::default().compression_method(entry.compression.method());
            zip.start_file(entry.relative_path.as_str(), options)?;
            let written = match &entry.source {
                EntrySource::Bytes(bytes) => {
                    zip.write_all(bytes)
                        .map_err(|e| ContainerError::io(dest_file, e))?;
                    bytes.len() as u64
                }
                EntrySource::File(path) => {
                    let mut input = File::open(path).map_err(|e| ContainerError::io(path, e))?;
                    copy_buffered(&mut input, &mut zip, &mut buf)
                        .map_err(|e| ContainerError::io(path, e))?
                }
            };
            debug!(entry = %entry.relative_path, bytes = written, "packed");
            summary.entries += 1;
            summary.bytes += written;
        }

        let mut out = zip.finish()?;
        out.flush().map_err(|e| ContainerError::io(dest_file, e))?;
        info!(dest = %dest_file.display(), entries = summary.entries, "packed archive");
        Ok(summary)
    }
}

fn copy_buffered<R: Read + ?Sized, W: Write + ?Sized>(
    reader: &mut R,
    writer: &mut W,
    buf: &mut [u8],
) -> io::Result<u64> {
    let mut total = 0u64;
    loop {
        let n = match reader.read(buf) {
            Ok(0) => return Ok(total),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        writer.write_all(&buf[..n])?;
        total += n as u64;
    }
}

/// [`ContainerCodec::unzip`] with the default buffer.
pub fn unzip(archive: &Path, dest: &Path) -> Result<ExtractSummary> {
    ContainerCodec::default().unzip(archive, dest)
}

/// [`ContainerCodec::zip_strict`] with the default buffer.
pub fn zip_strict(src: &Path, dest_file: &Path) -> Result<PackSummary> {
    ContainerCodec::default().zip_strict(src, dest_file)
}

/// [`ContainerCodec::entries`] with the default buffer.
pub fn entries(src: &Path) -> Result<Vec<ContainerEntry>> {
    ContainerCodec::default().entries(src)
}
