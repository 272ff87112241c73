//! Extraction of `#include` and `import` tokens from source text.

use anyhow::{Context, Result};
use regex::Regex;

/// Compiled token patterns for C/C++ and protobuf sources.
#[derive(Debug, Clone)]
pub struct SourceScanner {
    angle_include: Regex,
    quoted_include: Regex,
    import: Regex,
}

impl SourceScanner {
    /// Compile the include and import patterns.
    ///
    /// # Errors
    ///
    /// Fails only if a built-in pattern does not compile.
    pub fn new() -> Result<Self> {
        let angle_include = Regex::new(r"(?m)^[ \t]*#[ \t]*include[ \t]*<([^>\n]+)>")
            .context("Failed to compile include pattern")?;
        let quoted_include = Regex::new(r#"(?m)^[ \t]*#[ \t]*include[ \t]*"([^"\n]+)""#)
            .context("Failed to compile include pattern")?;
        let import = Regex::new(r#"(?m)^[ \t]*import[ \t]+(?:(?:public|weak)[ \t]+)?"([^"\n]+)""#)
            .context("Failed to compile import pattern")?;
        Ok(Self {
            angle_include,
            quoted_include,
            import,
        })
    }

    /// Include tokens of a C/C++ file: every `<x>` include in textual order,
    /// then every `"x"` include in textual order.
    ///
    /// Resolution keeps the first occurrence of each target, so this order
    /// decides which include names a target first in the dependency lists.
    pub fn includes(&self, content: &str) -> Vec<String> {
        [&self.angle_include, &self.quoted_include]
            .into_iter()
            .flat_map(|regex| regex.captures_iter(content).map(|caps| caps[1].to_string()))
            .collect()
    }

    /// Import paths of a `.proto` file in textual order.
    pub fn proto_imports(&self, content: &str) -> Vec<String> {
        self.import.captures_iter(content).map(|caps| caps[1].to_string()).collect()
    }
}
