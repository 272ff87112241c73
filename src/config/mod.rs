//! Configuration for depg
//!
//! depg reads an optional `depg.toml` at the repository root. Every key has a
//! default, so a repository following the usual conventions needs no file at
//! all.
//!
//! ```toml
//! header_extensions = ["-inl.hpp", ".hpp", ".h"]
//! source_extensions = [".cpp", ".cc", ".c"]
//! test_file_suffix = "_test.cpp"
//! test_main_target = "testing/gtest/gtest_main"
//!
//! forbidden_top_level_prefixes = ["build", "third-party", "tools"]
//! ignored_paths = ["experimental"]
//!
//! third_party_declarations = ["third_party/BUILD.toml"]
//! cache_directory = "build/.depg/cache"
//! cache_validity = "timestamp-or-checksum"
//!
//! [custom_headers]
//! "version_info.h" = "build_info/version"
//! ```
//!
//! # Paths
//!
//! All path-like options are relative to the repository root and validated
//! with [`crate::utils::fs::assert_relative`]. Forbidden and ignored entries are
//! matched as path prefixes; `forbidden_top_level_prefixes` are matched as
//! string prefixes of top-level entries, so `build` also forbids `build-dbg/`.

mod parser;
pub mod system_headers;

pub use parser::parse_config;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;

use crate::cache::ValidityPolicy;
use crate::core::DepgError;
use crate::utils::fs::{assert_relative, calculate_content_checksum};

/// Default config file name at the repository root.
pub const CONFIG_FILE_NAME: &str = "depg.toml";

/// All recognised configuration options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DepgConfig {
    /// Header extensions, tried in order; compound extensions first.
    pub header_extensions: Vec<String>,
    /// Source extensions, tried in order; the first existing one wins.
    pub source_extensions: Vec<String>,
    /// Extension of protobuf sources.
    pub proto_extension: String,
    /// Suffix of headers generated from protobuf sources.
    pub proto_header_suffix: String,
    /// Suffix of headers generated by the gRPC plugin.
    pub grpc_header_suffix: String,
    /// Source files ending with this suffix become `Test` targets.
    pub test_file_suffix: String,
    /// Top-level entries starting with any of these strings are never visited.
    pub forbidden_top_level_prefixes: Vec<String>,
    /// Paths that are never visited.
    pub forbidden_paths: BTreeSet<String>,
    /// Paths skipped during directory expansion unless requested explicitly.
    pub ignored_paths: BTreeSet<String>,
    /// When set, top-level directories not listed here are treated as ignored.
    pub top_directories: Option<Vec<String>>,
    /// Replaces the built-in system header list when set.
    pub system_headers: Option<BTreeSet<String>>,
    /// Added to the system header list.
    pub extra_system_headers: BTreeSet<String>,
    /// Headers that resolve to nothing, checked after all file-based rules.
    pub ignored_headers: BTreeSet<String>,
    /// Files whose existence is never asserted.
    pub ignore_existence: BTreeSet<String>,
    /// Explicit header prefix table; derived from declarations when unset.
    pub header_prefixes: Option<BTreeMap<String, String>>,
    /// Declaration files for hand-written (third-party) targets.
    pub third_party_declarations: Vec<String>,
    /// Exact header to target table used by the built-in custom classifier.
    pub custom_headers: BTreeMap<String, String>,
    /// Implicit private dependency of every `Test` target.
    pub test_main_target: Option<String>,
    /// Cache directory; empty disables caching.
    pub cache_directory: String,
    /// How cached file fingerprints are validated.
    pub cache_validity: ValidityPolicy,
}

impl Default for DepgConfig {
    fn default() -> Self {
        Self {
            header_extensions: strings(&["-inl.hpp", ".hpp", ".h"]),
            source_extensions: strings(&[".cpp", ".cc", ".c"]),
            proto_extension: ".proto".to_string(),
            proto_header_suffix: ".pb.h".to_string(),
            grpc_header_suffix: ".grpc.pb.h".to_string(),
            test_file_suffix: "_test.cpp".to_string(),
            forbidden_top_level_prefixes: strings(&["build", "third-party", "tools"]),
            forbidden_paths: BTreeSet::new(),
            ignored_paths: strings(&["experimental"]).into_iter().collect(),
            top_directories: None,
            system_headers: None,
            extra_system_headers: BTreeSet::new(),
            ignored_headers: strings(&["options.pb.h"]).into_iter().collect(),
            ignore_existence: BTreeSet::new(),
            header_prefixes: None,
            third_party_declarations: Vec::new(),
            custom_headers: BTreeMap::new(),
            test_main_target: None,
            cache_directory: "build/.depg/cache".to_string(),
            cache_validity: ValidityPolicy::default(),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

impl DepgConfig {
    /// Load the configuration for a repository.
    ///
    /// With an explicit `config_path` the file must exist. Otherwise
    /// `<root>/depg.toml` is used when present and defaults apply when not.
    pub fn load(root: &Path, config_path: Option<&Path>) -> Result<Self> {
        let config: Self = match config_path {
            Some(path) => parse_config(path)?,
            None => {
                let default_path = root.join(CONFIG_FILE_NAME);
                if default_path.is_file() {
                    parse_config(&default_path)?
                } else {
                    tracing::debug!("No {} found under {}, using defaults", CONFIG_FILE_NAME, root.display());
                    Self::default()
                }
            }
        };
        config.validate().context("Invalid depg configuration")?;
        Ok(config)
    }

    /// Check structural requirements that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.header_extensions.is_empty() || self.source_extensions.is_empty() {
            return Err(DepgError::ConfigError {
                message: "header_extensions and source_extensions must not be empty".to_string(),
            }
            .into());
        }
        for path in self
            .forbidden_paths
            .iter()
            .chain(&self.ignored_paths)
            .chain(&self.third_party_declarations)
            .chain(self.top_directories.iter().flatten())
        {
            assert_relative(path)?;
        }
        if !self.cache_directory.is_empty() {
            assert_relative(&self.cache_directory)?;
        }
        Ok(())
    }

    /// Header extensions followed by source extensions.
    pub fn cpp_extensions(&self) -> Vec<String> {
        self.header_extensions.iter().chain(&self.source_extensions).cloned().collect()
    }

    /// The effective set of headers that never produce a dependency.
    pub fn system_header_set(&self) -> HashSet<String> {
        let mut headers: HashSet<String> = match &self.system_headers {
            Some(list) => list.iter().cloned().collect(),
            None => system_headers::default_system_headers().map(str::to_string).collect(),
        };
        headers.extend(self.extra_system_headers.iter().cloned());
        headers
    }

    /// Whether caching is enabled.
    pub fn caching_enabled(&self) -> bool {
        !self.cache_directory.is_empty()
    }

    /// SHA-256 over every option that changes how an include or import
    /// resolves.
    ///
    /// Cached per-file results are only valid under the options they were
    /// computed with, so this checksum is part of the cache's upstream
    /// checksum. Options that only affect walking or typing of targets
    /// (`ignored_paths`, `test_main_target`, ...) are left out.
    ///
    /// # Errors
    ///
    /// Fails only if the options cannot be serialized.
    pub fn resolution_checksum(&self) -> Result<String> {
        let inputs = ResolutionInputs {
            header_extensions: &self.header_extensions,
            source_extensions: &self.source_extensions,
            proto_extension: &self.proto_extension,
            proto_header_suffix: &self.proto_header_suffix,
            grpc_header_suffix: &self.grpc_header_suffix,
            system_headers: self.system_headers.as_ref(),
            extra_system_headers: &self.extra_system_headers,
            ignored_headers: &self.ignored_headers,
            ignore_existence: &self.ignore_existence,
            header_prefixes: self.header_prefixes.as_ref(),
            custom_headers: &self.custom_headers,
        };
        let bytes = serde_json::to_vec(&inputs).context("Failed to serialize resolution options")?;
        Ok(calculate_content_checksum(&bytes))
    }
}

/// The resolution-relevant subset of [`DepgConfig`].
#[derive(Serialize)]
struct ResolutionInputs<'a> {
    header_extensions: &'a [String],
    source_extensions: &'a [String],
    proto_extension: &'a str,
    proto_header_suffix: &'a str,
    grpc_header_suffix: &'a str,
    system_headers: Option<&'a BTreeSet<String>>,
    extra_system_headers: &'a BTreeSet<String>,
    ignored_headers: &'a BTreeSet<String>,
    ignore_existence: &'a BTreeSet<String>,
    header_prefixes: Option<&'a BTreeMap<String, String>>,
    custom_headers: &'a BTreeMap<String, String>,
}
