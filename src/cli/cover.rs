//! `depg cover`: exact closure plus build order.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::builder::{TargetGraphBuilder, changed_paths_to_target_names};
use crate::config::DepgConfig;
use crate::core::{Target, TargetType};

/// Print the dependency closure of changed paths and a dependencies-first
/// build order. Any cycle aborts with the first cycle found.
#[derive(Args, Debug)]
pub struct CoverCommand {
    /// Changed files or directories, relative to the root.
    #[arg(required = true)]
    paths: Vec<String>,

    /// Declare a target as an executable before resolving (repeatable).
    #[arg(long = "executable", value_name = "TARGET")]
    executables: Vec<String>,
}

#[derive(Serialize)]
struct CoverOutput<'a> {
    targets: &'a BTreeMap<String, Target>,
    order: Vec<String>,
}

impl CoverCommand {
    /// Print the exact closure of the given paths and its build order.
    pub fn execute(self, root: &Path, config: DepgConfig) -> Result<()> {
        let roots = changed_paths_to_target_names(root, &self.paths, &config)?;
        let mut builder = TargetGraphBuilder::open(root, config)?;
        for name in self.executables {
            builder.declare_target(Target::new(name, TargetType::Executable));
        }

        let order = builder.dependency_order(&roots)?;
        let targets = builder.deps_cover(&roots)?;
        let output = CoverOutput {
            targets,
            order,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }
}
