//! Error handling for depg
//!
//! All resolution failures in depg are fatal: a silently skipped header or an
//! unknown target would corrupt the inferred graph, so errors bubble up through
//! the single synchronous call chain and abort the whole request.
//!
//! # Architecture
//!
//! - [`DepgError`] - Enumerated error types for every failure mode
//! - [`ErrorContext`] - Wrapper that adds user-friendly details and suggestions
//!
//! Library functions return [`anyhow::Result`] and raise [`DepgError`] values
//! through it, so callers can either display the error chain or downcast to a
//! specific variant:
//!
//! ```rust,no_run
//! use depg::core::DepgError;
//!
//! fn classify(err: &anyhow::Error) -> &'static str {
//!     match err.downcast_ref::<DepgError>() {
//!         Some(DepgError::UnrecognizedHeader { .. }) => "header",
//!         Some(DepgError::CircularDependency { .. }) => "cycle",
//!         _ => "other",
//!     }
//! }
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for depg operations.
///
/// Each variant carries the file, header token and requesting target where
/// applicable, so a user can locate the offending source line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DepgError {
    /// A path that must be relative to the repository root was absolute or
    /// not normalised (contains `.` / `..` components).
    #[error("Path '{path}' is not relative to the repository root")]
    NonRelativePath {
        /// The offending path
        path: String,
    },

    /// A file required by the source tree does not exist.
    #[error("'{path}' doesn't exist{}", requester_suffix(.requested_by))]
    FileNotFound {
        /// Repository-relative path of the missing file
        path: String,
        /// The file or target that required it, if known
        requested_by: Option<String>,
    },

    /// An include token matched no resolution rule.
    #[error("Unrecognized header '{header}' in file '{file}'")]
    UnrecognizedHeader {
        /// The raw include token
        header: String,
        /// The file containing the include
        file: String,
    },

    /// No filesystem convention matched a target name.
    #[error("Unable to recognize the target '{name}'{}", parent_suffix(.parent))]
    UnrecognizedTarget {
        /// The target name
        name: String,
        /// The target whose dependency list referenced it
        parent: Option<String>,
    },

    /// The builder was asked to populate a target type it cannot infer.
    #[error("Cannot build target '{name}' of type {target_type} from source")]
    UnsupportedTargetType {
        /// The target name
        name: String,
        /// Display name of the target type
        target_type: String,
    },

    /// Edges were requested for a target that was never declared.
    #[error("Target '{name}' has not been declared")]
    UnknownTarget {
        /// The target name
        name: String,
    },

    /// The dependency graph contains a cycle.
    #[error("Circular dependency detected: {cycle}")]
    CircularDependency {
        /// The first detected cycle, rendered as `a -> b -> a`
        cycle: String,
    },

    /// Two declarations share one fully-qualified name.
    #[error("Found multiple targets with name '{name}' in {file}")]
    DuplicateDeclaration {
        /// The fully-qualified target name
        name: String,
        /// The declaration file containing the duplicate
        file: String,
    },

    /// A dependency reference in a declaration is malformed.
    #[error("Invalid dependency '{dep}' of '{target}'")]
    InvalidDependency {
        /// The dependency reference as written
        dep: String,
        /// The declaring target
        target: String,
    },

    /// A declaration file could not be parsed.
    #[error("Failed to parse declaration file {file}: {reason}")]
    DeclarationParseError {
        /// The declaration file
        file: String,
        /// Parser message
        reason: String,
    },

    /// Configuration is invalid.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// A cache read was attempted without a valid entry.
    #[error("No valid cache entry for '{path}'")]
    CacheEntryMissing {
        /// The file the lookup was keyed by
        path: String,
    },
}

fn requester_suffix(requested_by: &Option<String>) -> String {
    requested_by.as_ref().map(|r| format!(". Required by '{r}'")).unwrap_or_default()
}

fn parent_suffix(parent: &Option<String>) -> String {
    parent.as_ref().map(|p| format!(" in the deps of '{p}'")).unwrap_or_default()
}

/// Error context wrapper that adds details and suggestions for CLI users.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error message
    pub error: String,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub fn new(error: impl fmt::Display) -> Self {
        Self {
            error: error.to_string(),
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details explaining why the error happened.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr with colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] with suggestions where a
/// [`DepgError`] can be found in the chain.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    // Keep the full chain in the headline so file/token context survives.
    let headline = format!("{error:#}");

    let Some(depg_error) = error.chain().find_map(|e| e.downcast_ref::<DepgError>()) else {
        if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
            return ErrorContext::new(headline)
                .with_details(toml_error.message().to_string())
                .with_suggestion("Check the TOML syntax of depg.toml and declaration files");
        }
        return ErrorContext::new(headline);
    };

    let ctx = ErrorContext::new(headline);
    match depg_error {
        DepgError::UnrecognizedHeader { .. } => ctx
            .with_details("No include rule, header-prefix entry or custom classifier matched the header")
            .with_suggestion(
                "Add the header to `system_headers`, `ignored_headers`, `custom_headers`, \
                 or declare a third-party target with a matching `header_prefix`",
            ),
        DepgError::UnrecognizedTarget { .. } => ctx
            .with_details("Target names must match a source file stem or a .proto file")
            .with_suggestion("Check that the referenced file exists relative to the repository root"),
        DepgError::CircularDependency { .. } => ctx
            .with_details("Cycles are reported, never broken automatically")
            .with_suggestion("Break the include cycle, e.g. by moving shared declarations into a new header"),
        DepgError::FileNotFound { .. } => ctx.with_suggestion(
            "Create the file, fix the include, or list it under `ignore_existence` in depg.toml",
        ),
        DepgError::NonRelativePath { .. } => {
            ctx.with_suggestion("Run from the repository root and pass paths relative to it")
        }
        DepgError::DuplicateDeclaration { .. } | DepgError::InvalidDependency { .. } => {
            ctx.with_suggestion("Fix the declaration file named above")
        }
        _ => ctx,
    }
}
