//! Repository-relative path helpers.
//!
//! depg works on slash-delimited strings relative to the repository root
//! (`base/strings.hpp`), never on absolute paths: target names, cache keys and
//! include tokens are all in that form. These helpers validate and manipulate
//! such strings without touching the filesystem.

use anyhow::Result;

use crate::core::DepgError;

/// Checks that `path` is relative and normalised.
///
/// A valid relative path has no leading `/`, no `.` or `..` components and no
/// empty components, i.e. it is its own `relpath`.
pub fn assert_relative(path: &str) -> Result<()> {
    if is_normalized_relative(path) {
        Ok(())
    } else {
        Err(DepgError::NonRelativePath {
            path: path.to_string(),
        }
        .into())
    }
}

fn is_normalized_relative(path: &str) -> bool {
    if path.is_empty() || path.starts_with('/') || path.contains('\\') {
        return false;
    }
    path.trim_end_matches('/').split('/').all(|c| !c.is_empty() && c != "." && c != "..")
}

/// Returns the directory part of a slash-delimited path, or `""` at the root.
pub fn parent_dir(path: &str) -> &str {
    path.rsplit_once('/').map_or("", |(dir, _)| dir)
}

/// Joins `rel` onto `dir` and resolves `.` / `..` components.
///
/// Returns `None` when the result would escape the repository root.
#[must_use]
pub fn join_relative(dir: &str, rel: &str) -> Option<String> {
    let mut components: Vec<&str> = Vec::new();
    for component in dir.split('/').chain(rel.split('/')) {
        match component {
            "" | "." => {}
            ".." => {
                components.pop()?;
            }
            other => components.push(other),
        }
    }
    if components.is_empty() {
        return None;
    }
    Some(components.join("/"))
}

/// Returns `true` if `value` ends with any of `extensions`.
pub fn has_extension(value: &str, extensions: &[String]) -> bool {
    extensions.iter().any(|ext| value.ends_with(ext.as_str()))
}

/// Strips the first matching extension, in list order.
///
/// Order matters for compound extensions: with `["-inl.hpp", ".hpp"]`,
/// `a/b-inl.hpp` becomes `a/b`, not `a/b-inl`.
pub fn strip_extension<'a>(value: &'a str, extensions: &[String]) -> Option<&'a str> {
    extensions.iter().find_map(|ext| value.strip_suffix(ext.as_str()))
}
