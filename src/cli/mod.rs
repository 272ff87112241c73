//! Command-line interface for depg.
//!
//! # Commands
//!
//! - `deps` - Infer the targets of changed files and everything they depend on
//! - `cover` - Like `deps`, limited to the exact closure and with a build order
//!
//! # Global Options
//!
//! - `--root` - Repository root; all paths are relative to it (default `.`)
//! - `--config` - Configuration file (default `<root>/depg.toml`)
//! - `--verbose` - Enable debug output
//! - `--quiet` - Suppress all output except errors
//!
//! # Examples
//!
//! ```bash
//! # Targets of two changed files, as JSON
//! depg deps base/strings.cpp net/socket.hpp
//!
//! # Closure and build order of a whole directory
//! depg --root ~/src/monorepo cover server/
//!
//! # Debug cache behaviour
//! depg --verbose deps .
//! ```
//!
//! Logging goes to stderr; stdout carries only the JSON result.

mod cover;
mod deps;

pub use cover::CoverCommand;
pub use deps::DepsCommand;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::DepgConfig;

/// Logging settings derived from the global flags.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Filter directive for the log subscriber; `None` disables logging.
    ///
    /// When logging is enabled, `RUST_LOG` takes precedence over the level.
    pub log_level: Option<String>,
}

impl CliConfig {
    /// Install the global `tracing` subscriber, writing to stderr.
    pub fn init_logging(&self) {
        let Some(level) = &self.log_level else {
            return;
        };
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new(level)
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

/// Dependency graph generator for C++ and protobuf source trees.
#[derive(Parser, Debug)]
#[command(
    name = "depg",
    about = "Infer C++/protobuf build targets and their dependencies from source includes",
    version,
    long_about = "depg reads #include and import statements, resolves them to build targets \
                  and prints the resulting target graph as JSON."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Repository root; input paths are relative to it.
    #[arg(long, global = true, default_value = ".", env = "DEPG_ROOT")]
    root: PathBuf,

    /// Configuration file (defaults to `<root>/depg.toml` when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output for debugging.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all output except errors and the result.
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the inferred target map for changed files or directories.
    Deps(DepsCommand),

    /// Print the exact dependency closure and its build order.
    Cover(CoverCommand),
}

impl Cli {
    /// Run the parsed command with logging derived from the flags.
    pub fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config)
    }

    /// Translate verbosity flags into a [`CliConfig`].
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            None
        } else {
            Some("info".to_string())
        };
        CliConfig {
            log_level,
        }
    }

    /// Run the parsed command with an explicit [`CliConfig`].
    ///
    /// # Errors
    ///
    /// Propagates configuration and resolution errors; `main` renders them.
    pub fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.init_logging();

        let depg_config = DepgConfig::load(&self.root, self.config.as_deref())?;
        match self.command {
            Commands::Deps(cmd) => cmd.execute(&self.root, depg_config),
            Commands::Cover(cmd) => cmd.execute(&self.root, depg_config),
        }
    }
}
