// Copyright (c) 2025 - Cowboy AI, Inc.
//! Error types for topology composition

use thiserror::Error;

/// Errors raised during the construction phases of a composer run.
///
/// These indicate a programming or configuration defect, are raised
/// immediately, and abort the run. Invariant breaches detected after the
/// graph is assembled are reported as [`crate::validate::Violation`]s
/// instead, so every defect can be reported in one pass.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ComposerError {
    /// The deployment spec is malformed (empty suffix, no regions, ...)
    #[error("Invalid deployment spec: {0}")]
    SpecValidation(String),

    /// The same (scope, logical name) pair was reserved twice in one run
    #[error("Name already reserved in scope '{scope}': {logical_name}")]
    NameCollision { scope: String, logical_name: String },

    /// A subnet offset fell outside the per-region reserved range
    #[error("Address space exhausted: {0}")]
    AddressSpaceExhausted(String),

    /// A node with this id already exists in the graph
    #[error("Duplicate node id in graph: {0}")]
    DuplicateNode(String),

    /// The binding layer failed to encode a node; no partial output is kept
    #[error("Failed to encode node '{id}': {reason}")]
    Encoding { id: String, reason: String },
}

/// Result type for composer operations
pub type ComposerResult<T> = Result<T, ComposerError>;
