//! Header and import resolution
//!
//! The resolver turns the raw `#include` / `import` tokens of one file into
//! the targets that provide them. Each C/C++ include token goes through an
//! ordered list of rules and the first rule that matches decides:
//!
//! 1. system or standard library header: ignored
//! 2. generated gRPC header (`x.grpc.pb.h`): gRPC target `x.grpc`, which
//!    depends on `x.proto` (the proto must exist)
//! 3. generated protobuf header (`x.pb.h`) with an existing `x.proto`: that
//!    proto library
//! 4. C/C++ header found relative to the repository root, or else relative to
//!    the including file: the source target of its stem
//! 5. a header prefix table entry, longest prefix first (`glog/logging.h`
//!    matches `glog`)
//! 6. explicitly ignored header: ignored
//! 7. the pluggable [`HeaderClassifier`]
//! 8. anything else is an [`DepgError::UnrecognizedHeader`]
//!
//! Protobuf imports are simpler: every import except the
//! `google/protobuf/` runtime becomes a public dependency on that proto.
//!
//! # Caching
//!
//! Two levels of caching keep repeated runs cheap:
//!
//! - the per-file result lives in the [`FileValueCache`] and survives across
//!   runs as long as the file's fingerprint matches
//! - the per-token result is memoised in memory for one session, keyed by the
//!   token and the directory of the including file, because rule 4 depends on
//!   that directory

mod classifier;
mod scan;

pub use classifier::{HeaderClassifier, NoCustomHeaders, StaticHeaderClassifier};
pub use scan::SourceScanner;

use anyhow::{Context, Result};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::PathBuf;

use crate::cache::FileValueCache;
use crate::config::DepgConfig;
use crate::core::{DepgError, ResolvedDep, TargetType};
use crate::utils::fs::{has_extension, join_relative, parent_dir, strip_extension};

/// Namespace of protobuf runtime imports, which never produce a dependency.
pub const PROTOBUF_RUNTIME_PREFIX: &str = "google/protobuf/";

/// Resolves the includes and imports of source files into target references.
pub struct SourceDepsResolver {
    root: PathBuf,
    config: DepgConfig,
    system_headers: HashSet<String>,
    header_prefixes: HashMap<String, String>,
    classifier: Box<dyn HeaderClassifier>,
    scanner: SourceScanner,
    cache: Option<FileValueCache>,
    token_cache: HashMap<(String, String), Option<ResolvedDep>>,
    parsed_files: usize,
}

impl SourceDepsResolver {
    /// Create a resolver for the repository at `root`.
    ///
    /// `header_prefixes` maps slash-delimited include prefixes to the target
    /// owning them; trailing slashes on keys are ignored. Passing `None` as
    /// `cache` disables the per-file cache.
    pub fn new(
        root: impl Into<PathBuf>,
        config: &DepgConfig,
        header_prefixes: BTreeMap<String, String>,
        classifier: Box<dyn HeaderClassifier>,
        cache: Option<FileValueCache>,
    ) -> Result<Self> {
        let header_prefixes = header_prefixes
            .into_iter()
            .map(|(prefix, target)| (prefix.trim_end_matches('/').to_string(), target))
            .collect();

        Ok(Self {
            root: root.into(),
            config: config.clone(),
            system_headers: config.system_header_set(),
            header_prefixes,
            classifier,
            scanner: SourceScanner::new()?,
            cache,
            token_cache: HashMap::new(),
            parsed_files: 0,
        })
    }

    /// The per-file cache, if caching is enabled.
    pub fn cache(&self) -> Option<&FileValueCache> {
        self.cache.as_ref()
    }

    /// Number of files actually read and parsed (cache misses) so far.
    pub fn parsed_files(&self) -> usize {
        self.parsed_files
    }

    /// Targets referenced by the includes of a C/C++ file, first occurrence
    /// of each target name only.
    pub fn cpp_source_to_deps(&mut self, file: &str) -> Result<Vec<ResolvedDep>> {
        if let Some(deps) = self.cached(file)? {
            return Ok(deps);
        }

        let content = self.read_source(file)?;
        let headers = self.scanner.includes(&content);

        let mut seen = HashSet::new();
        let mut deps = Vec::new();
        for header in &headers {
            if let Some(dep) = self.resolve_header(header, file)?
                && seen.insert(dep.name.clone())
            {
                deps.push(dep);
            }
        }

        tracing::debug!("Resolved {} includes of '{}' to {} targets", headers.len(), file, deps.len());
        self.remember(file, &deps)?;
        Ok(deps)
    }

    /// Proto libraries imported by a `.proto` file.
    pub fn proto_source_to_deps(&mut self, file: &str) -> Result<Vec<ResolvedDep>> {
        if let Some(deps) = self.cached(file)? {
            return Ok(deps);
        }

        let content = self.read_source(file)?;
        let mut seen = HashSet::new();
        let mut deps = Vec::new();
        for import in self.scanner.proto_imports(&content) {
            if import.starts_with(PROTOBUF_RUNTIME_PREFIX) {
                continue;
            }
            self.assert_exists(&import, file)?;
            if seen.insert(import.clone()) {
                deps.push(ResolvedDep::new(import, TargetType::ProtoLibrary));
            }
        }

        self.remember(file, &deps)?;
        Ok(deps)
    }

    /// Resolve one include token found in `file`.
    ///
    /// Returns `Ok(None)` for headers that produce no dependency.
    pub fn resolve_header(&mut self, header: &str, file: &str) -> Result<Option<ResolvedDep>> {
        let key = (header.to_string(), parent_dir(file).to_string());
        if let Some(resolved) = self.token_cache.get(&key) {
            return Ok(resolved.clone());
        }
        let resolved = self.classify(header, file)?;
        self.token_cache.insert(key, resolved.clone());
        Ok(resolved)
    }

    fn classify(&self, header: &str, file: &str) -> Result<Option<ResolvedDep>> {
        let config = &self.config;

        if self.system_headers.contains(header) {
            return Ok(None);
        }

        if let Some(stem) = header.strip_suffix(config.grpc_header_suffix.as_str()) {
            let proto = format!("{stem}{}", config.proto_extension);
            self.assert_exists(&proto, file)?;
            return Ok(Some(ResolvedDep {
                name: format!("{stem}.grpc"),
                target_type: TargetType::GrpcLibrary,
                deps: vec![proto],
            }));
        }

        if let Some(stem) = header.strip_suffix(config.proto_header_suffix.as_str()) {
            let proto = format!("{stem}{}", config.proto_extension);
            if self.is_file(&proto) {
                return Ok(Some(ResolvedDep::new(proto, TargetType::ProtoLibrary)));
            }
        }

        if has_extension(header, &config.header_extensions) {
            let found = [join_relative("", header), join_relative(parent_dir(file), header)]
                .into_iter()
                .flatten()
                .find(|candidate| self.is_file(candidate));
            if let Some(path) = found
                && let Some(name) = strip_extension(&path, &config.header_extensions)
            {
                return Ok(Some(ResolvedDep::new(name, TargetType::SourceFile)));
            }
        }

        if let Some(target) = self.header_prefix_target(header) {
            return Ok(Some(ResolvedDep::new(target, TargetType::SourceFile)));
        }

        if config.ignored_headers.contains(header) {
            return Ok(None);
        }

        if let Some(dep) = self.classifier.classify(header) {
            return Ok(Some(dep));
        }

        Err(DepgError::UnrecognizedHeader {
            header: header.to_string(),
            file: file.to_string(),
        }
        .into())
    }

    /// Longest slash-delimited prefix of `header` present in the prefix table.
    fn header_prefix_target(&self, header: &str) -> Option<&str> {
        let mut prefix = header;
        loop {
            if let Some(target) = self.header_prefixes.get(prefix) {
                return Some(target.as_str());
            }
            prefix = prefix.rsplit_once('/')?.0;
        }
    }

    fn is_file(&self, path: &str) -> bool {
        self.root.join(path).is_file()
    }

    fn assert_exists(&self, path: &str, requested_by: &str) -> Result<()> {
        if self.config.ignore_existence.contains(path) || self.is_file(path) {
            return Ok(());
        }
        Err(DepgError::FileNotFound {
            path: path.to_string(),
            requested_by: Some(requested_by.to_string()),
        }
        .into())
    }

    fn read_source(&mut self, file: &str) -> Result<String> {
        let path = self.root.join(file);
        if !path.is_file() {
            return Err(DepgError::FileNotFound {
                path: file.to_string(),
                requested_by: None,
            }
            .into());
        }
        let bytes =
            std::fs::read(&path).with_context(|| format!("Failed to read source file: {}", path.display()))?;
        self.parsed_files += 1;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn cached(&self, file: &str) -> Result<Option<Vec<ResolvedDep>>> {
        let Some(cache) = &self.cache else {
            return Ok(None);
        };
        let Some(value) = cache.lookup(file)? else {
            tracing::debug!("Cache miss for '{}'", file);
            return Ok(None);
        };
        match serde_json::from_value::<Vec<ResolvedDep>>(value.clone()) {
            Ok(deps) => {
                tracing::trace!("Cache hit for '{}'", file);
                Ok(Some(deps))
            }
            Err(e) => {
                tracing::debug!("Ignoring unreadable cache entry for '{}': {}", file, e);
                Ok(None)
            }
        }
    }

    fn remember(&mut self, file: &str, deps: &[ResolvedDep]) -> Result<()> {
        if let Some(cache) = &mut self.cache {
            cache.put(file, serde_json::to_value(deps)?)?;
        }
        Ok(())
    }
}
