//! `depg deps`: inferred targets for changed paths.

use anyhow::Result;
use clap::Args;
use std::path::Path;

use crate::builder::{TargetGraphBuilder, changed_paths_to_target_names};
use crate::config::DepgConfig;
use crate::core::{Target, TargetType};

/// Print the target map for changed files or directories.
///
/// The map contains the targets of the given paths, fully populated, plus
/// every target they transitively depend on.
#[derive(Args, Debug)]
pub struct DepsCommand {
    /// Changed files or directories, relative to the root.
    #[arg(required = true)]
    paths: Vec<String>,

    /// Declare a target as an executable before resolving (repeatable).
    #[arg(long = "executable", value_name = "TARGET")]
    executables: Vec<String>,
}

impl DepsCommand {
    /// Print the target map reachable from the given paths.
    pub fn execute(self, root: &Path, config: DepgConfig) -> Result<()> {
        let roots = changed_paths_to_target_names(root, &self.paths, &config)?;
        let mut builder = TargetGraphBuilder::open(root, config)?;
        for name in self.executables {
            builder.declare_target(Target::new(name, TargetType::Executable));
        }

        let targets = builder.get_deps(&roots)?;
        println!("{}", serde_json::to_string_pretty(targets)?);
        Ok(())
    }
}
