//! File system utilities
//!
//! # Key Features
//!
//! - **Atomic operations**: the cache file is written with temp-and-rename
//! - **Checksum validation**: SHA-256 content checksums for change detection
//! - **Relative paths**: validation and normalisation of repository-relative names

pub mod atomic;
pub mod metadata;
pub mod paths;

pub use atomic::{atomic_write, ensure_dir};
pub use metadata::{calculate_checksum, calculate_content_checksum, modified_time_ms};
pub use paths::{assert_relative, has_extension, join_relative, parent_dir, strip_extension};
