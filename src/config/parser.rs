//! Generic TOML parsing with file path context.
//!
//! Used for both `depg.toml` and third-party declaration files. Errors carry
//! two levels of context: which file failed, and whether it was the read or
//! the parse.

use anyhow::{Context, Result};
use std::path::Path;

/// Parse a TOML file into any [`serde::de::DeserializeOwned`] type.
pub fn parse_config<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: T = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    Ok(config)
}
