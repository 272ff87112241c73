//! Last-chance classification of include tokens.
//!
//! After every file-based rule has failed, the resolver hands the token to a
//! [`HeaderClassifier`]. Repositories with generated headers or vendored code
//! that follows no naming convention plug their knowledge in here.

use std::collections::BTreeMap;

use crate::core::{ResolvedDep, TargetType};

/// Maps an otherwise unrecognised header to a target.
pub trait HeaderClassifier {
    /// Returns the target providing `header`, or `None` to let resolution fail.
    fn classify(&self, header: &str) -> Option<ResolvedDep>;
}

/// Classifier that never recognises anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCustomHeaders;

impl HeaderClassifier for NoCustomHeaders {
    fn classify(&self, _header: &str) -> Option<ResolvedDep> {
        None
    }
}

/// Exact header to target table, built from the `custom_headers` option.
#[derive(Debug, Default, Clone)]
pub struct StaticHeaderClassifier {
    table: BTreeMap<String, String>,
}

impl StaticHeaderClassifier {
    /// Classify exactly the headers in `table`; each maps to a `SourceFile`
    /// target of the given name.
    pub fn new(table: BTreeMap<String, String>) -> Self {
        Self {
            table,
        }
    }
}

impl HeaderClassifier for StaticHeaderClassifier {
    fn classify(&self, header: &str) -> Option<ResolvedDep> {
        self.table.get(header).map(|target| ResolvedDep::new(target.clone(), TargetType::SourceFile))
    }
}
