// SPDX-License-Identifier: PMPL-1.0-or-later
//! Error types for semantic relationship models.
//!
//! Every variant except [`SemanticError::IndexOutOfRange`] describes a
//! configuration problem: a malformed restriction, an unknown class, or a
//! schema that does not load. Evaluating a well-formed rule set against any
//! list of values never fails.

use thiserror::Error;

/// Semantic model errors
#[derive(Error, Debug)]
pub enum SemanticError {
    #[error("unknown statement kind in {0:?}")]
    UnknownStatementKind(String),

    #[error("statement {0:?} requires a numeric bound")]
    MissingBound(String),

    #[error("invalid bound in statement {statement:?}: {reason}")]
    InvalidBound { statement: String, reason: String },

    #[error("statement {0:?} has no class combinations")]
    EmptyAlternativeSet(String),

    #[error("unknown class: {0}")]
    UnknownClass(String),

    #[error("cyclic class hierarchy among: {}", .0.join(", "))]
    CyclicHierarchy(Vec<String>),

    #[error("class already registered: {0}")]
    DuplicateClass(String),

    #[error("{0} is an individual, individuals are valueless")]
    IndividualHasNoRelationships(String),

    #[error("class {class} has no relationship field {field}")]
    UnknownRelationship { class: String, field: String },

    #[error("index {index} out of range for relationship of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SemanticError {
    /// Whether this error stems from rule or vocabulary configuration,
    /// as opposed to misuse of a relationship's value list.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, SemanticError::IndexOutOfRange { .. })
    }
}

/// Crate-level result alias using [`SemanticError`].
pub type Result<T> = std::result::Result<T, SemanticError>;
