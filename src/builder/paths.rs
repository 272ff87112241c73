//! Mapping changed files and directories to target names.
//!
//! Directories are expanded recursively with forbidden and ignored paths
//! pruned. An ignored directory is still expanded when it is the requested
//! path or contains it: asking for `experimental/rpc` lists that directory
//! even though `experimental` is ignored.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;
use walkdir::WalkDir;

use crate::config::DepgConfig;
use crate::core::DepgError;
use crate::utils::fs::{assert_relative, strip_extension};

/// Target names for a list of repository-relative files or directories.
///
/// Files that belong to no target (neither C/C++ nor proto) are skipped.
/// The result keeps first-seen order without duplicates.
pub fn changed_paths_to_target_names(root: &Path, paths: &[String], config: &DepgConfig) -> Result<Vec<String>> {
    let cpp_extensions = config.cpp_extensions();
    let mut files = Vec::new();

    for path in paths {
        let rel = if path == "." {
            ""
        } else {
            assert_relative(path)?;
            path.trim_end_matches('/')
        };
        let absolute = root.join(rel);
        if absolute.is_file() {
            if !is_forbidden(rel, config) {
                files.push(rel.to_string());
            }
        } else if absolute.is_dir() {
            files.extend(list_directory_recursive(root, rel, config)?);
        } else {
            return Err(DepgError::FileNotFound {
                path: path.clone(),
                requested_by: None,
            }
            .into());
        }
    }

    let mut seen = HashSet::new();
    let targets: Vec<String> = files
        .iter()
        .filter_map(|file| file_to_target(file, &cpp_extensions, &config.proto_extension))
        .filter(|target| seen.insert(target.clone()))
        .collect();

    tracing::debug!("{} changed paths map to {} targets", paths.len(), targets.len());
    Ok(targets)
}

/// The target owning `file`: C/C++ files drop their extension, protos keep it.
pub fn file_to_target(file: &str, cpp_extensions: &[String], proto_extension: &str) -> Option<String> {
    if let Some(stem) = strip_extension(file, cpp_extensions) {
        return Some(stem.to_string());
    }
    file.ends_with(proto_extension).then(|| file.to_string())
}

/// Every file below `directory`, sorted by name within each directory.
fn list_directory_recursive(root: &Path, directory: &str, config: &DepgConfig) -> Result<Vec<String>> {
    if !directory.is_empty() && is_forbidden(directory, config) {
        return Ok(Vec::new());
    }

    let walker = WalkDir::new(root.join(directory)).sort_by_file_name().into_iter().filter_entry(|entry| {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return true;
        }
        let rel = relative_name(root, entry.path());
        !is_forbidden(&rel, config) && !is_ignored(&rel, config)
    });

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to list directory: {}", root.join(directory).display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = relative_name(root, entry.path());
        if !is_forbidden(&rel, config) {
            files.push(rel);
        }
    }
    Ok(files)
}

fn relative_name(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn top_level(path: &str) -> &str {
    path.split('/').next().unwrap_or(path)
}

fn is_forbidden(path: &str, config: &DepgConfig) -> bool {
    let top = top_level(path);
    config.forbidden_top_level_prefixes.iter().any(|prefix| top.starts_with(prefix.as_str()))
        || config.forbidden_paths.iter().any(|forbidden| is_same_or_below(path, forbidden))
}

/// Checked only for directories met while walking, never for the requested one.
fn is_ignored(path: &str, config: &DepgConfig) -> bool {
    if config.ignored_paths.contains(path) {
        return true;
    }
    match &config.top_directories {
        Some(allowed) if !path.contains('/') => !allowed.iter().any(|dir| dir == path),
        _ => false,
    }
}

fn is_same_or_below(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    path == prefix || path.strip_prefix(prefix).is_some_and(|rest| rest.starts_with('/'))
}
