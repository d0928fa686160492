//! Folioforge - EPUB image sanitizer
//!
//! This library crate exposes the sanitizer, job driver, and configuration
//! for the `folioforge` binary and for integration testing.

pub mod config;
pub mod events;
pub mod job;
pub mod sanitizer;
