//! Folioforge-Common: Shared types, constants, and utilities.
//!
//! This crate provides common functionality used across folioforge:
//!
//! - **Core Types**: the sniffed [`ImageFormat`] and the per-file [`SanitizeStatus`]
//! - **Reports**: [`SanitizationReport`] and the derived [`AggregateStats`]
//! - **Action Tags**: the strings recorded in a report's `actions` list
//! - **Path Utilities**: image extension detection and extension→format lookup
//! - **Error Handling**: the error returned when parsing format and status names
//!
//! # Examples
//!
//! ```
//! use folioforge_common::paths::{expected_format, is_image_file};
//! use folioforge_common::ImageFormat;
//! use std::path::Path;
//!
//! assert!(is_image_file(Path::new("OEBPS/images/cover.JPG")));
//! assert_eq!(expected_format(Path::new("fig1.tif")), Some(ImageFormat::Tiff));
//! ```

pub mod actions;
pub mod error;
pub mod paths;
pub mod report;
pub mod types;

pub use error::Error;
pub use report::{AggregateStats, SanitizationReport};
pub use types::*;
