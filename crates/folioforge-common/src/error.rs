//! Common error types used throughout folioforge.
//!
//! Raised when parsing format and status names back from reports.

/// Common error type for folioforge.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An unknown image format name was supplied.
    #[error("Unknown image format: {0}")]
    UnknownFormat(String),

    /// An unknown report status was supplied.
    #[error("Unknown status: {0}")]
    UnknownStatus(String),
}
