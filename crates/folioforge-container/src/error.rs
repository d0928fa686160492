//! Error types for container operations.

use std::path::PathBuf;

/// Result type alias using [`ContainerError`].
pub type Result<T> = std::result::Result<T, ContainerError>;

/// Archive-level failures. Per-entry path problems are not errors; they are
/// reported through [`ExtractSummary::skipped`](crate::ExtractSummary).
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Central directory unreadable or an entry could not be decompressed.
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Walking the source tree failed.
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// The source for packing is not a directory.
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
}

impl ContainerError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
