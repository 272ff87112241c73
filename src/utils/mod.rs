//! Filesystem and path utilities
//!
//! Everything depg touches on disk goes through these helpers so that
//! repository-relative paths are validated in one place and the cache file
//! is always written atomically.
//!
//! # Modules
//!
//! - [`fs`] - Atomic writes, checksums, modification times and relative-path handling

pub mod fs;

pub use fs::{atomic_write, calculate_checksum, calculate_content_checksum, ensure_dir, modified_time_ms};
