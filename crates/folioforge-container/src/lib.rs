//! Folioforge-Container: EPUB (OCF zip) extraction and repacking.
//!
//! [`unzip`] refuses to write anything outside the destination directory and
//! keeps going when it meets a hostile entry. [`zip_strict`] produces an
//! archive whose first entry is an uncompressed `mimetype`, as EPUB readers
//! require.
//!
//! ```no_run
//! use std::path::Path;
//!
//! let summary = folioforge_container::unzip(Path::new("book.epub"), Path::new("work"))?;
//! println!("{} files, {} skipped", summary.files, summary.skipped.len());
//! folioforge_container::zip_strict(Path::new("work"), Path::new("book_sanitized.epub"))?;
//! # Ok::<(), folioforge_container::ContainerError>(())
//! ```

pub mod codec;
pub mod entry;
pub mod error;
pub mod safe_path;

pub use codec::{entries, unzip, zip_strict, ContainerCodec, ExtractSummary, PackSummary};
pub use entry::{Compression, ContainerEntry, EPUB_MIMETYPE, MIMETYPE};
pub use error::{ContainerError, Result};
