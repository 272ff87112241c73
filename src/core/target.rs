//! Build target types.
//!
//! A [`Target`] is a named, typed build unit. Source-derived targets are named
//! after the repository-relative path of their file stem (`base/strings` for
//! `base/strings.hpp` + `base/strings.cpp`); protobuf targets keep the `.proto`
//! extension and gRPC targets use the `<stem>.grpc` synthetic name.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of a build target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    /// A C/C++ translation unit plus its same-stem headers.
    SourceFile,
    /// A binary; one of its deps or sources defines `main`.
    Executable,
    /// A test binary (`*_test.cpp` by convention).
    Test,
    /// A shared library.
    SharedLib,
    /// A static library.
    StaticLib,
    /// A placeholder target with no build actions.
    NopTarget,
    /// A `.proto` file compiled to C++ message classes.
    ProtoLibrary,
    /// gRPC service stubs generated from a `.proto` file.
    GrpcLibrary,
    /// A hand-written rule the inference engine does not populate.
    Custom,
}

impl TargetType {
    /// Returns `true` for target kinds populated from C/C++ sources.
    pub fn is_cpp(self) -> bool {
        matches!(
            self,
            Self::SourceFile | Self::Executable | Self::Test | Self::SharedLib | Self::StaticLib
        )
    }

    /// Constructor-style name used in rendered BUILD files, e.g. `SourceFile`.
    pub fn rule_name(self) -> &'static str {
        match self {
            Self::SourceFile => "SourceFile",
            Self::Executable => "Executable",
            Self::Test => "Test",
            Self::SharedLib => "SharedLib",
            Self::StaticLib => "StaticLib",
            Self::NopTarget => "NopTarget",
            Self::ProtoLibrary => "ProtoLibrary",
            Self::GrpcLibrary => "GrpcLibrary",
            Self::Custom => "Custom",
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.rule_name())
    }
}

/// A build target and its inferred attributes.
///
/// Attribute lists are ordered; empty lists are omitted when serialized so the
/// emitted map only mentions what was actually discovered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Unique, path-shaped target name.
    pub name: String,
    /// Immutable after the first declaration.
    #[serde(rename = "type")]
    pub target_type: TargetType,
    /// Header files owned by this target.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hdrs: Vec<String>,
    /// Source files owned by this target.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub srcs: Vec<String>,
    /// Dependencies visible to, and inherited by, dependents.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub public_deps: Vec<String>,
    /// Dependencies used only by this target.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub private_deps: Vec<String>,
}

impl Target {
    /// Create a stub with only a name and type.
    pub fn new(name: impl Into<String>, target_type: TargetType) -> Self {
        Self {
            name: name.into(),
            target_type,
            hdrs: Vec::new(),
            srcs: Vec::new(),
            public_deps: Vec::new(),
            private_deps: Vec::new(),
        }
    }

    /// Private deps followed by public deps: the outgoing edges of this target.
    pub fn all_deps(&self) -> Vec<String> {
        self.private_deps.iter().chain(&self.public_deps).cloned().collect()
    }
}

/// A dependency produced by resolving one include or import token.
///
/// This is what the resolver caches per file; `deps` carries implied
/// dependencies of synthetic targets (a gRPC target needs its proto library).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedDep {
    /// Target name the token resolves to.
    pub name: String,
    /// Type to declare the target with if it is new.
    #[serde(rename = "type")]
    pub target_type: TargetType,
    /// Extra public dependencies of the resolved target.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deps: Vec<String>,
}

impl ResolvedDep {
    /// Resolved dependency without implied deps.
    pub fn new(name: impl Into<String>, target_type: TargetType) -> Self {
        Self {
            name: name.into(),
            target_type,
            deps: Vec::new(),
        }
    }
}
