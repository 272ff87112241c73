//! Core types for depg
//!
//! This module defines the vocabulary shared by every other module:
//!
//! - [`Target`] / [`TargetType`] - named, typed build units and their attributes
//! - [`ResolvedDep`] - the result of resolving one include/import token
//! - [`DepgError`] - every failure mode, with file/token/parent context
//! - [`ErrorContext`] / [`user_friendly_error`] - CLI-facing error rendering
//!
//! # Target naming
//!
//! Target names are repository-relative and slash-delimited. C/C++ targets drop
//! the file extension (`net/socket` owns `net/socket.hpp` and `net/socket.cpp`),
//! protobuf targets keep it (`net/rpc.proto`), and gRPC targets are synthetic
//! (`net/rpc.grpc`).

pub mod error;
mod target;

pub use error::{DepgError, ErrorContext, user_friendly_error};
pub use target::{ResolvedDep, Target, TargetType};
