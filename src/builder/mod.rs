//! Target graph construction
//!
//! [`TargetGraphBuilder`] owns one session's target map. Targets enter the map
//! as typed stubs the first time anything names them, either as a request root
//! or as somebody's dependency, and are populated from their sources at most
//! once, when the graph algorithms first ask for their edges.
//!
//! # Population rules
//!
//! For the C/C++ family (`SourceFile`, `Executable`, `Test`, `SharedLib`,
//! `StaticLib`) a target named `a/b` owns every existing `a/b<header ext>`
//! and the first existing `a/b<source ext>`. Includes of the headers become
//! public dependencies; includes of the source file become private
//! dependencies, minus anything already public and minus the target itself.
//! `Test` targets also get the configured test main as their first private
//! dependency.
//!
//! A `ProtoLibrary` publicly depends on the protos it imports. A
//! `GrpcLibrary` is fully described by the include that created it.
//!
//! Targets from declaration files are taken as written and never populated
//! from source.
//!
//! # Example
//!
//! ```rust,no_run
//! use depg::builder::TargetGraphBuilder;
//! use depg::config::DepgConfig;
//! use depg::core::{Target, TargetType};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut builder = TargetGraphBuilder::open(".", DepgConfig::default())?;
//! builder.declare_target(Target::new("server/main", TargetType::Executable));
//! let order = builder.dependency_order(&["server/main".to_string()])?;
//! println!("{}", order.join("\n"));
//! # Ok(())
//! # }
//! ```

mod paths;

pub use paths::{changed_paths_to_target_names, file_to_target};

use anyhow::{Context, Result};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::cache::FileValueCache;
use crate::config::DepgConfig;
use crate::core::{DepgError, ResolvedDep, Target, TargetType};
use crate::declarations::{DeclarationRegistry, upstream_checksum};
use crate::graph::{self, TopoSort, render_cycle};
use crate::resolver::{SourceDepsResolver, StaticHeaderClassifier};

/// Builds the dependency graph of a source tree on demand.
pub struct TargetGraphBuilder {
    root: PathBuf,
    config: DepgConfig,
    resolver: SourceDepsResolver,
    targets: BTreeMap<String, Target>,
    external: BTreeMap<String, Target>,
    built: HashSet<String>,
    edge_cache: HashMap<String, Vec<String>>,
}

impl TargetGraphBuilder {
    /// Create a builder around an existing resolver.
    pub fn new(root: impl Into<PathBuf>, config: DepgConfig, resolver: SourceDepsResolver) -> Self {
        Self {
            root: root.into(),
            config,
            resolver,
            targets: BTreeMap::new(),
            external: BTreeMap::new(),
            built: HashSet::new(),
            edge_cache: HashMap::new(),
        }
    }

    /// Start a session for the repository at `root`.
    ///
    /// Loads the configured declaration files, derives the header prefix table
    /// from them unless one is configured, loads the fingerprint cache (when
    /// enabled) and installs the `custom_headers` table as the custom
    /// classifier. The cache is guarded by the checksum of the resolution
    /// options together with the declarations' checksum, so editing either
    /// invalidates every cached file.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use depg::builder::TargetGraphBuilder;
    /// use depg::config::DepgConfig;
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let root = std::path::PathBuf::from("/path/to/repo");
    /// let config = DepgConfig::load(&root, None)?;
    /// let mut builder = TargetGraphBuilder::open(root, config)?;
    /// let targets = builder.get_deps(&["net/socket".to_string()])?;
    /// println!("{} targets", targets.len());
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// Fails when a declaration file is missing or malformed, when two
    /// declarations share a name, or when the resolver cannot be built.
    pub fn open(root: impl Into<PathBuf>, config: DepgConfig) -> Result<Self> {
        let root = root.into();
        let registry = DeclarationRegistry::load(&root, &config.third_party_declarations)
            .context("Failed to load target declarations")?;

        let header_prefixes = match &config.header_prefixes {
            Some(table) => table.clone(),
            None => registry.header_prefix_map(),
        };

        let cache = if config.caching_enabled() {
            // Resolution options first, then the declaration files.
            let mut upstream = config.resolution_checksum()?;
            if let Some(declarations) = upstream_checksum(&root, &config.third_party_declarations)? {
                upstream.push(':');
                upstream.push_str(&declarations);
            }
            Some(FileValueCache::load(
                root.clone(),
                &root.join(&config.cache_directory),
                config.cache_validity,
                Some(upstream),
            ))
        } else {
            None
        };

        let classifier = Box::new(StaticHeaderClassifier::new(config.custom_headers.clone()));
        let resolver = SourceDepsResolver::new(root.clone(), &config, header_prefixes, classifier, cache)?;

        let mut builder = Self::new(root, config, resolver);
        builder.declare_all(&registry);
        Ok(builder)
    }

    /// Repository root all target names are relative to.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The include resolver, e.g. to inspect cache statistics.
    pub fn resolver(&self) -> &SourceDepsResolver {
        &self.resolver
    }

    /// All targets known so far.
    pub fn targets(&self) -> &BTreeMap<String, Target> {
        &self.targets
    }

    /// A known target by name, without building anything.
    pub fn target(&self, name: &str) -> Option<&Target> {
        self.targets.get(name)
    }

    /// Insert `target` unless its name is already known; the first
    /// declaration wins. Returns whether anything was inserted.
    ///
    /// A name with a hand-written declaration always takes that declaration.
    pub fn declare_target(&mut self, target: Target) -> bool {
        if self.targets.contains_key(&target.name) {
            return false;
        }
        let target = match self.external.get(&target.name) {
            Some(declared) => {
                self.built.insert(declared.name.clone());
                declared.clone()
            }
            None => target,
        };
        self.targets.insert(target.name.clone(), target);
        true
    }

    /// Make hand-written declarations available. They enter the target map
    /// lazily, the first time something references them.
    pub fn declare_all(&mut self, registry: &DeclarationRegistry) {
        for declaration in registry.iter() {
            self.external
                .entry(declaration.target.name.clone())
                .or_insert_with(|| declaration.target.clone());
        }
    }

    /// Type of `name`: known or declared type first, then filesystem convention.
    ///
    /// `parent` names the referring target for the error message.
    pub fn resolve_target_type(&self, name: &str, parent: Option<&str>) -> Result<TargetType> {
        if let Some(target) = self.targets.get(name).or_else(|| self.external.get(name)) {
            return Ok(target.target_type);
        }
        if name.ends_with(self.config.proto_extension.as_str()) {
            return Ok(TargetType::ProtoLibrary);
        }
        for ext in self.config.cpp_extensions() {
            let file = format!("{name}{ext}");
            if self.root.join(&file).is_file() {
                if file.ends_with(self.config.test_file_suffix.as_str()) {
                    return Ok(TargetType::Test);
                }
                return Ok(TargetType::SourceFile);
            }
        }
        Err(DepgError::UnrecognizedTarget {
            name: name.to_string(),
            parent: parent.map(ToString::to_string),
        }
        .into())
    }

    /// Populate `name` from its sources. Idempotent.
    pub fn build_target(&mut self, name: &str) -> Result<()> {
        if self.built.contains(name) {
            return Ok(());
        }
        let mut target = self
            .targets
            .get(name)
            .cloned()
            .ok_or_else(|| DepgError::UnknownTarget {
                name: name.to_string(),
            })?;

        match target.target_type {
            t if t.is_cpp() => self.build_cpp_target(&mut target)?,
            TargetType::ProtoLibrary => self.build_proto_target(&mut target)?,
            TargetType::GrpcLibrary => {}
            other => {
                return Err(DepgError::UnsupportedTargetType {
                    name: name.to_string(),
                    target_type: other.to_string(),
                }
                .into());
            }
        }
        tracing::debug!(
            "Built {} '{}': {} public, {} private deps",
            target.target_type,
            name,
            target.public_deps.len(),
            target.private_deps.len()
        );

        self.targets.insert(name.to_string(), target);
        self.built.insert(name.to_string());
        Ok(())
    }

    fn build_cpp_target(&mut self, target: &mut Target) -> Result<()> {
        let config = &self.config;
        if target.hdrs.is_empty() {
            target.hdrs = config
                .header_extensions
                .iter()
                .map(|ext| format!("{}{ext}", target.name))
                .filter(|file| self.root.join(file).is_file())
                .collect();
        }
        if target.srcs.is_empty() {
            target.srcs = config
                .source_extensions
                .iter()
                .map(|ext| format!("{}{ext}", target.name))
                .find(|file| self.root.join(file).is_file())
                .into_iter()
                .collect();
        }

        let public_deps = self.sources_to_deps(&target.hdrs, &target.name)?;

        let mut private_deps = Vec::new();
        if target.target_type == TargetType::Test
            && let Some(main) = self.config.test_main_target.clone()
        {
            self.declare_target(Target::new(main.clone(), TargetType::SourceFile));
            private_deps.push(main);
        }
        private_deps.extend(self.sources_to_deps(&target.srcs, &target.name)?);

        let public_set: HashSet<&String> = public_deps.iter().collect();
        let mut seen = HashSet::new();
        private_deps.retain(|dep| !public_set.contains(dep) && seen.insert(dep.clone()));

        target.public_deps = public_deps;
        target.private_deps = private_deps;
        Ok(())
    }

    fn build_proto_target(&mut self, target: &mut Target) -> Result<()> {
        let deps = self.resolver.proto_source_to_deps(&target.name)?;
        target.public_deps = deps.iter().map(|dep| dep.name.clone()).collect();
        for dep in deps {
            self.declare_resolved(dep);
        }
        Ok(())
    }

    /// Resolved includes of `files`, declared and de-duplicated, without `owner`.
    fn sources_to_deps(&mut self, files: &[String], owner: &str) -> Result<Vec<String>> {
        let mut seen = HashSet::new();
        let mut names = Vec::new();
        for file in files {
            for dep in self.resolver.cpp_source_to_deps(file)? {
                if dep.name == owner || !seen.insert(dep.name.clone()) {
                    continue;
                }
                names.push(dep.name.clone());
                self.declare_resolved(dep);
            }
        }
        Ok(names)
    }

    fn declare_resolved(&mut self, dep: ResolvedDep) {
        let mut target = Target::new(dep.name, dep.target_type);
        target.public_deps = dep.deps;
        self.declare_target(target);
    }

    /// Outgoing edges of `name`: private deps, then public deps.
    ///
    /// Builds the target on first use and declares a typed stub for every
    /// dependency not seen before.
    pub fn edges(&mut self, name: &str) -> Result<Vec<String>> {
        if let Some(edges) = self.edge_cache.get(name) {
            return Ok(edges.clone());
        }
        if !self.targets.contains_key(name) {
            return Err(DepgError::UnknownTarget {
                name: name.to_string(),
            }
            .into());
        }
        self.build_target(name)?;
        let edges = self.targets.get(name).map(Target::all_deps).unwrap_or_default();
        for dep in &edges {
            if !self.targets.contains_key(dep) {
                let target_type = self.resolve_target_type(dep, Some(name))?;
                self.declare_target(Target::new(dep.clone(), target_type));
            }
        }
        self.edge_cache.insert(name.to_string(), edges.clone());
        Ok(edges)
    }

    fn declare_roots(&mut self, roots: &[String]) -> Result<()> {
        for root in roots {
            if !self.targets.contains_key(root) {
                let target_type = self.resolve_target_type(root, None)?;
                self.declare_target(Target::new(root.clone(), target_type));
            }
        }
        Ok(())
    }

    /// Expand everything reachable from `roots` and return the whole target
    /// map, including anything earlier requests discovered.
    ///
    /// # Errors
    ///
    /// Returns the first [`DepgError`] met while expanding: an unrecognized
    /// root or dependency, an unresolvable include, or a missing file. The
    /// cache is only stored after a successful expansion.
    pub fn get_deps(&mut self, roots: &[String]) -> Result<&BTreeMap<String, Target>> {
        self.declare_roots(roots)?;
        let reached = graph::deps_cover(roots, |name: &String| self.edges(name))?;
        tracing::info!("Resolved {} targets from {} roots", reached.len(), roots.len());
        self.save_cache()?;
        Ok(&self.targets)
    }

    /// Like [`get_deps`](Self::get_deps), but prune the map down to exactly
    /// the targets reachable from `roots`.
    ///
    /// # Errors
    ///
    /// Same as [`get_deps`](Self::get_deps).
    pub fn deps_cover(&mut self, roots: &[String]) -> Result<&BTreeMap<String, Target>> {
        self.declare_roots(roots)?;
        let reached = graph::deps_cover(roots, |name: &String| self.edges(name))?;
        let reached: HashSet<String> = reached.into_iter().collect();

        self.targets.retain(|name, _| reached.contains(name));
        self.built.retain(|name| reached.contains(name));
        self.edge_cache.retain(|name, _| reached.contains(name));

        tracing::info!("Dependency cover of {} roots has {} targets", roots.len(), self.targets.len());
        self.save_cache()?;
        Ok(&self.targets)
    }

    /// Dependencies-first order of everything reachable from `roots`, with
    /// every cycle found on the way.
    pub fn topological_sort(&mut self, roots: &[String]) -> Result<TopoSort<String>> {
        self.declare_roots(roots)?;
        graph::topological_sort(roots, |name: &String| self.edges(name))
    }

    /// Dependencies-first order of everything reachable from `roots`.
    ///
    /// # Errors
    ///
    /// Fails with [`DepgError::CircularDependency`] naming the first cycle,
    /// or with any error [`get_deps`](Self::get_deps) can return.
    pub fn dependency_order(&mut self, roots: &[String]) -> Result<Vec<String>> {
        let sorted = self.topological_sort(roots)?;
        if let Some(cycle) = sorted.first_cycle() {
            return Err(DepgError::CircularDependency {
                cycle: render_cycle(cycle),
            }
            .into());
        }
        Ok(sorted.order)
    }

    /// Persist the fingerprint cache, if caching is enabled.
    pub fn save_cache(&self) -> Result<()> {
        if let Some(cache) = self.resolver.cache()
            && self.config.caching_enabled()
        {
            cache
                .store(&self.root.join(&self.config.cache_directory))
                .context("Failed to store the dependency cache")?;
        }
        Ok(())
    }
}
