//! Test utilities for depg
//!
//! Helpers shared by unit tests and the integration suite: one-time logging
//! setup and quick construction of source trees on disk.
//!
//! # Example
//!
//! ```rust,no_run
//! use depg::test_utils::{init_test_logging, write_files};
//!
//! init_test_logging(None);
//! let temp = tempfile::tempdir().unwrap();
//! write_files(temp.path(), &[("f1.hpp", ""), ("f2.hpp", "#include \"f1.hpp\"\n")]);
//! ```

use std::path::Path;
use std::sync::Once;
use std::time::{Duration, SystemTime};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Uses `level` when given, otherwise `RUST_LOG`; with neither, tests run
/// without a subscriber.
///
/// ```bash
/// RUST_LOG=depg=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}

/// Write `(relative path, content)` pairs below `root`, creating directories.
///
/// Panics on I/O failure; meant for test setup only.
pub fn write_files(root: &Path, files: &[(&str, &str)]) {
    for (path, content) in files {
        let full = root.join(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent)
                .unwrap_or_else(|e| panic!("Failed to create {}: {e}", parent.display()));
        }
        std::fs::write(&full, content).unwrap_or_else(|e| panic!("Failed to write {}: {e}", full.display()));
    }
}

/// Force the modification time of `path` to `millis` since the Unix epoch.
pub fn set_mtime_ms(path: &Path, millis: u64) {
    let when = SystemTime::UNIX_EPOCH + Duration::from_millis(millis);
    std::fs::File::options()
        .write(true)
        .open(path)
        .and_then(|file| file.set_modified(when))
        .unwrap_or_else(|e| panic!("Failed to set mtime of {}: {e}", path.display()));
}
