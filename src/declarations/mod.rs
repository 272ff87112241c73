//! Hand-written target declarations
//!
//! Some targets cannot be inferred from source: vendored third-party libraries,
//! prebuilt archives, code generators. They are declared in TOML files, one
//! `[[target]]` table per target:
//!
//! ```toml
//! # third_party/BUILD.toml
//! [[target]]
//! name = "glog"
//! type = "static_lib"
//! header_prefix = ["glog/"]
//! public_deps = [":gflags"]
//!
//! [[target]]
//! name = "gflags"
//! type = "static_lib"
//! header_prefix = ["gflags/"]
//! ```
//!
//! Names are relative to the directory of the declaring file, so the targets
//! above are `third_party/glog` and `third_party/gflags`. Dependency references
//! are normalised to full names: `:gflags` means "in this directory" and
//! `base:strings` is shorthand for `base/strings`.
//!
//! `header_prefix` feeds the resolver's prefix table: with the file above, an
//! `#include "glog/logging.h"` anywhere in the tree resolves to
//! `third_party/glog`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::core::{DepgError, Target, TargetType};
use crate::utils::fs::{assert_relative, calculate_checksum, parent_dir};

/// A declared target plus declaration-only metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// The target with fully-qualified name, files and deps.
    pub target: Target,
    /// Include prefixes this target provides.
    pub header_prefix: Vec<String>,
    /// Repository-relative path of the declaring file.
    pub file: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DeclarationFile {
    #[serde(default, rename = "target")]
    targets: Vec<RawDeclaration>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDeclaration {
    name: String,
    #[serde(rename = "type")]
    target_type: TargetType,
    #[serde(default)]
    hdrs: Vec<String>,
    #[serde(default)]
    srcs: Vec<String>,
    #[serde(default)]
    public_deps: Vec<String>,
    #[serde(default)]
    private_deps: Vec<String>,
    #[serde(default)]
    header_prefix: Vec<String>,
}

/// Read the declarations of one repository-relative file, in file order.
pub fn read_declarations(root: &Path, file: &str) -> Result<Vec<Declaration>> {
    assert_relative(file)?;
    let path = root.join(file);
    if !path.is_file() {
        return Err(DepgError::FileNotFound {
            path: file.to_string(),
            requested_by: None,
        }
        .into());
    }
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read declaration file: {}", path.display()))?;

    let parsed: DeclarationFile = toml::from_str(&content).map_err(|e| DepgError::DeclarationParseError {
        file: file.to_string(),
        reason: e.message().to_string(),
    })?;

    let directory = parent_dir(file);
    parsed.targets.into_iter().map(|raw| normalize(raw, directory, file)).collect()
}

fn normalize(raw: RawDeclaration, directory: &str, file: &str) -> Result<Declaration> {
    let name = qualify(directory, &raw.name);
    let expand = |deps: Vec<String>| -> Result<Vec<String>> {
        deps.into_iter().map(|dep| expand_dependency(&dep, directory, &name)).collect()
    };

    let mut target = Target::new(name.clone(), raw.target_type);
    target.public_deps = expand(raw.public_deps)?;
    target.private_deps = expand(raw.private_deps)?;
    target.hdrs = raw.hdrs.iter().map(|h| qualify(directory, h)).collect();
    target.srcs = raw.srcs.iter().map(|s| qualify(directory, s)).collect();

    Ok(Declaration {
        target,
        header_prefix: raw.header_prefix,
        file: file.to_string(),
    })
}

fn qualify(directory: &str, name: &str) -> String {
    if directory.is_empty() {
        name.to_string()
    } else {
        format!("{directory}/{name}")
    }
}

/// Expand a dependency reference to a fully-qualified target name.
///
/// `:x` is relative to `directory`; elsewhere `:` is a path separator.
pub fn expand_dependency(dep: &str, directory: &str, target: &str) -> Result<String> {
    if dep.is_empty() || dep.trim() != dep {
        return Err(DepgError::InvalidDependency {
            dep: dep.to_string(),
            target: target.to_string(),
        }
        .into());
    }
    Ok(match dep.strip_prefix(':') {
        Some(local) => qualify(directory, local),
        None => dep.replace(':', "/"),
    })
}

/// Caller-owned collection of declarations, keyed by full target name.
///
/// A registry lives for one session; [`reset`](Self::reset) clears it for the
/// next one.
#[derive(Debug, Default)]
pub struct DeclarationRegistry {
    declarations: Vec<Declaration>,
    index: HashMap<String, usize>,
}

impl DeclarationRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every file in order into a fresh registry.
    pub fn load(root: &Path, files: &[String]) -> Result<Self> {
        let mut registry = Self::new();
        for file in files {
            registry.load_file(root, file)?;
        }
        Ok(registry)
    }

    /// Add the declarations of one file; returns how many were added.
    pub fn load_file(&mut self, root: &Path, file: &str) -> Result<usize> {
        let declarations = read_declarations(root, file)?;
        let count = declarations.len();
        for declaration in declarations {
            self.insert(declaration)?;
        }
        tracing::debug!("Loaded {} declarations from {}", count, file);
        Ok(count)
    }

    /// Add one declaration; names must be unique across the registry.
    pub fn insert(&mut self, declaration: Declaration) -> Result<()> {
        let name = declaration.target.name.clone();
        if self.index.contains_key(&name) {
            return Err(DepgError::DuplicateDeclaration {
                name,
                file: declaration.file,
            }
            .into());
        }
        self.index.insert(name, self.declarations.len());
        self.declarations.push(declaration);
        Ok(())
    }

    /// Declaration with the full target name `name`, e.g. `third_party/glog`.
    pub fn get(&self, name: &str) -> Option<&Declaration> {
        self.index.get(name).map(|&i| &self.declarations[i])
    }

    /// Declarations in load order.
    pub fn iter(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations.iter()
    }

    /// Number of declarations loaded.
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    /// Whether no declaration has been loaded.
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Forget everything.
    pub fn reset(&mut self) {
        self.declarations.clear();
        self.index.clear();
    }

    /// Include prefix to owning target, over all declarations.
    ///
    /// Later declarations win when two claim the same prefix.
    pub fn header_prefix_map(&self) -> BTreeMap<String, String> {
        self.declarations
            .iter()
            .flat_map(|d| d.header_prefix.iter().map(move |p| (p.clone(), d.target.name.clone())))
            .collect()
    }
}

/// Checksum over the given declaration files, `:`-joined in order.
///
/// Returns `None` without files; the builder then guards the cache with the
/// resolution options' checksum alone.
pub fn upstream_checksum(root: &Path, files: &[String]) -> Result<Option<String>> {
    if files.is_empty() {
        return Ok(None);
    }
    let checksums = files
        .iter()
        .map(|file| calculate_checksum(&root.join(file)))
        .collect::<Result<Vec<_>>>()?;
    Ok(Some(checksums.join(":")))
}
