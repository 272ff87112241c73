//! depg - dependency graph generator for C++ and protobuf source trees
//!
//! depg infers build targets and the dependencies between them directly from
//! source content, so per-directory build declarations can be kept in sync
//! with the code automatically instead of by hand.
//!
//! # Architecture Overview
//!
//! One target exists per source-file stem: `net/socket.hpp` and
//! `net/socket.cpp` form the target `net/socket`. Its dependencies come from
//! `#include` lines: headers' includes are public dependencies, the source
//! file's includes are private ones. Protobuf files form `ProtoLibrary`
//! targets depending on what they `import`.
//!
//! The graph is discovered lazily. A request names a few changed files; their
//! targets are parsed, which surfaces new targets, which are parsed in turn,
//! until the closure is complete. A content fingerprint cache keeps unchanged
//! files from being parsed again on the next run.
//!
//! # Core Modules
//!
//! - [`builder`] - Target map, population from sources, request entry points
//! - [`resolver`] - Include/import token resolution into targets
//! - [`graph`] - Closure and cycle-aware topological sort over lazy edges
//! - [`cache`] - Fingerprint cache of per-file results, persisted as JSON
//! - [`declarations`] - Hand-written (third-party) target declarations
//! - [`config`] - `depg.toml` options and defaults
//! - [`core`] - Targets, target types and errors
//! - [`cli`] - The `depg` command line
//! - [`utils`] - Checksums, atomic writes and relative-path helpers
//!
//! # Example
//!
//! ```rust,no_run
//! use depg::builder::TargetGraphBuilder;
//! use depg::config::DepgConfig;
//!
//! # fn main() -> anyhow::Result<()> {
//! let root = std::path::Path::new(".");
//! let config = DepgConfig::load(root, None)?;
//! let mut builder = TargetGraphBuilder::open(root, config)?;
//! for (name, target) in builder.get_deps(&["server/main".to_string()])? {
//!     println!("{name}: {:?}", target.public_deps);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration (depg.toml)
//!
//! ```toml
//! test_main_target = "testing/gtest_main"
//! third_party_declarations = ["third_party/BUILD.toml"]
//! ignored_paths = ["experimental"]
//!
//! [custom_headers]
//! "version_info.h" = "build_info/version"
//! ```

pub mod builder;
pub mod cache;
pub mod cli;
pub mod config;
pub mod core;
pub mod declarations;
pub mod graph;
pub mod resolver;
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
