//! Content fingerprint cache
//!
//! Parsing every header of a large tree on each run is the dominant cost of
//! dependency inference. [`FileValueCache`] remembers an opaque value per file
//! (the resolved dependency list) together with the file's modification time
//! and content checksum, and hands the value back on later runs as long as the
//! file has not changed.
//!
//! # Validity
//!
//! Timestamps are cheap but unreliable: a fresh checkout or `touch` changes
//! them without changing content. The checksum is therefore the authoritative
//! fallback. Under [`ValidityPolicy::TimestampOrChecksum`] an entry is valid if
//! either the recorded mtime or the recorded checksum still matches; under
//! [`ValidityPolicy::ChecksumOnly`] only the checksum counts, which also catches
//! content edits that kept the old mtime.
//!
//! # Persistence
//!
//! The cache is one flat JSON object in `<cache_directory>/cache.json`:
//!
//! ```json
//! {
//!   "__DEPG_VERSION__": 3,
//!   "DEPG_DEPS_CACHE_CHECKSUM": "9f86d0...",
//!   "base/strings.hpp": {"timestamp": 1700000000123, "checksum": "2cf2...", "value": [...]}
//! }
//! ```
//!
//! The two reserved keys guard the whole file: a different format version or a
//! different upstream checksum (covering resolution options and declarations)
//! discards every entry. So does any unreadable content. Loading never fails.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::core::DepgError;
use crate::utils::fs::{atomic_write, calculate_checksum, modified_time_ms};

/// Name of the cache file within the cache directory.
pub const CACHE_FILE_NAME: &str = "cache.json";

/// Bump when the shape of cached values changes.
pub const CACHE_FORMAT_VERSION: u64 = 3;

const VERSION_KEY: &str = "__DEPG_VERSION__";
const UPSTREAM_CHECKSUM_KEY: &str = "DEPG_DEPS_CACHE_CHECKSUM";

/// How a recorded fingerprint is compared against the file on disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidityPolicy {
    /// Valid if the mtime matches, else if the checksum matches.
    #[default]
    TimestampOrChecksum,
    /// Valid only if the checksum matches.
    ChecksumOnly,
}

/// One cached file: fingerprint plus the cached value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileFingerprint {
    /// Modification time in milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// Hex-encoded SHA-256 of the file content.
    pub checksum: String,
    /// Opaque payload.
    pub value: Value,
}

/// Per-file value cache keyed by repository-relative path.
#[derive(Debug)]
pub struct FileValueCache {
    root: PathBuf,
    policy: ValidityPolicy,
    upstream_checksum: Option<String>,
    entries: BTreeMap<String, FileFingerprint>,
}

impl FileValueCache {
    /// Create an empty cache for files under `root`.
    pub fn new(root: impl Into<PathBuf>, policy: ValidityPolicy) -> Self {
        Self {
            root: root.into(),
            policy,
            upstream_checksum: None,
            entries: BTreeMap::new(),
        }
    }

    /// Set the checksum covering upstream inputs, stored under a reserved key.
    #[must_use]
    pub fn with_upstream_checksum(mut self, checksum: Option<String>) -> Self {
        self.upstream_checksum = checksum;
        self
    }

    /// Number of cached files.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if `file` has an entry that is still valid.
    pub fn contains(&self, file: &str) -> Result<bool> {
        Ok(self.lookup(file)?.is_some())
    }

    /// Returns the cached value of `file`.
    ///
    /// Calling this without a valid entry is an error; check [`contains`](Self::contains)
    /// first or use [`lookup`](Self::lookup).
    pub fn get(&self, file: &str) -> Result<&Value> {
        self.lookup(file)?.ok_or_else(|| {
            DepgError::CacheEntryMissing {
                path: file.to_string(),
            }
            .into()
        })
    }

    /// Returns the cached value of `file` if its entry is still valid.
    pub fn lookup(&self, file: &str) -> Result<Option<&Value>> {
        let Some(entry) = self.entries.get(file) else {
            return Ok(None);
        };
        let path = self.root.join(file);

        if self.policy == ValidityPolicy::TimestampOrChecksum
            && modified_time_ms(&path)? == entry.timestamp
        {
            return Ok(Some(&entry.value));
        }
        if calculate_checksum(&path)? == entry.checksum {
            return Ok(Some(&entry.value));
        }
        tracing::trace!("Cache entry for '{}' is stale", file);
        Ok(None)
    }

    /// Store `value` for `file`, fingerprinting the file as it is now.
    pub fn put(&mut self, file: &str, value: Value) -> Result<()> {
        let path = self.root.join(file);
        let fingerprint = FileFingerprint {
            timestamp: modified_time_ms(&path)?,
            checksum: calculate_checksum(&path)?,
            value,
        };
        self.entries.insert(file.to_string(), fingerprint);
        Ok(())
    }

    /// The flat persisted record, including the reserved keys.
    pub fn export(&self) -> Result<Map<String, Value>> {
        let mut data = Map::new();
        data.insert(VERSION_KEY.to_string(), Value::from(CACHE_FORMAT_VERSION));
        data.insert(
            UPSTREAM_CHECKSUM_KEY.to_string(),
            self.upstream_checksum.clone().map_or(Value::Null, Value::String),
        );
        for (file, entry) in &self.entries {
            data.insert(file.clone(), serde_json::to_value(entry)?);
        }
        Ok(data)
    }

    /// Rebuild a cache from a persisted record.
    ///
    /// Returns an empty cache when the reserved keys do not match or any entry
    /// is malformed. Entries of files that no longer exist are dropped, so
    /// deleted and renamed files do not accumulate across runs.
    pub fn import(
        root: impl Into<PathBuf>,
        policy: ValidityPolicy,
        upstream_checksum: Option<String>,
        mut data: Map<String, Value>,
    ) -> Self {
        let mut cache = Self::new(root, policy).with_upstream_checksum(upstream_checksum);

        let version = data.remove(VERSION_KEY);
        let upstream = data.remove(UPSTREAM_CHECKSUM_KEY);
        let expected_upstream = cache.upstream_checksum.clone().map_or(Value::Null, Value::String);
        if version != Some(Value::from(CACHE_FORMAT_VERSION))
            || upstream.unwrap_or(Value::Null) != expected_upstream
        {
            tracing::debug!("Cache version or upstream checksum changed, starting cold");
            return cache;
        }

        let mut entries = BTreeMap::new();
        for (file, value) in data {
            match serde_json::from_value::<FileFingerprint>(value) {
                Ok(entry) => {
                    entries.insert(file, entry);
                }
                Err(e) => {
                    tracing::debug!("Malformed cache entry for '{}' ({}), starting cold", file, e);
                    return cache;
                }
            }
        }
        let before = entries.len();
        entries.retain(|file, _| cache.root.join(file).is_file());
        if entries.len() < before {
            tracing::debug!("Dropped {} cache entries for files that no longer exist", before - entries.len());
        }
        cache.entries = entries;
        cache
    }

    /// Load `<cache_dir>/cache.json`, falling back to an empty cache.
    pub fn load(
        root: impl Into<PathBuf>,
        cache_dir: &Path,
        policy: ValidityPolicy,
        upstream_checksum: Option<String>,
    ) -> Self {
        let root = root.into();
        let file = cache_dir.join(CACHE_FILE_NAME);

        let data = std::fs::read_to_string(&file)
            .ok()
            .filter(|content| !content.trim().is_empty())
            .and_then(|content| match serde_json::from_str::<Map<String, Value>>(&content) {
                Ok(data) => Some(data),
                Err(e) => {
                    tracing::debug!("Unreadable cache file {} ({}), starting cold", file.display(), e);
                    None
                }
            })
            .unwrap_or_default();

        let cache = Self::import(root, policy, upstream_checksum, data);
        tracing::debug!("Loaded {} cache entries from {}", cache.len(), file.display());
        cache
    }

    /// Persist to `<cache_dir>/cache.json` atomically.
    pub fn store(&self, cache_dir: &Path) -> Result<()> {
        let file = cache_dir.join(CACHE_FILE_NAME);
        let json = serde_json::to_string(&self.export()?)?;
        atomic_write(&file, json.as_bytes())?;
        tracing::debug!("Stored {} cache entries to {}", self.len(), file.display());
        Ok(())
    }
}
