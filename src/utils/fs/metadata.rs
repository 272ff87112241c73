//! File metadata: content checksums and modification times.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use std::time::UNIX_EPOCH;

use crate::core::DepgError;

/// Calculates the SHA-256 checksum of a file, hex encoded.
///
/// Checksumming a file that does not exist is a precondition violation and
/// reported as [`DepgError::FileNotFound`] rather than a plain I/O error.
pub fn calculate_checksum(path: &Path) -> Result<String> {
    if !path.is_file() {
        return Err(DepgError::FileNotFound {
            path: path.display().to_string(),
            requested_by: None,
        }
        .into());
    }

    let content = fs::read(path)
        .with_context(|| format!("Failed to read file for checksum: {}", path.display()))?;

    Ok(calculate_content_checksum(&content))
}

/// Calculates the SHA-256 checksum of in-memory content, hex encoded.
pub fn calculate_content_checksum(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}

/// Returns the modification time of a file in milliseconds since the Unix epoch.
pub fn modified_time_ms(path: &Path) -> Result<i64> {
    let metadata = fs::metadata(path)
        .with_context(|| format!("Failed to get metadata for: {}", path.display()))?;

    let modified = metadata
        .modified()
        .with_context(|| format!("Failed to get modification time for: {}", path.display()))?;

    // Pre-epoch timestamps are clamped; they only need to compare equal to themselves.
    let millis = modified.duration_since(UNIX_EPOCH).map(|d| d.as_millis()).unwrap_or(0);
    Ok(i64::try_from(millis).unwrap_or(i64::MAX))
}
