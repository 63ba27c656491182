// /////////////////////////////////////////////////////////////////////////////
// SlideTap Core
// Licensed under the Apache License, Version 2.0.
// /////////////////////////////////////////////////////////////////////////////

//! Domain-specific errors for the curation engine.
//!
//! The variants follow the taxonomy in the design's error-handling section:
//! entities that don't exist, lifecycle/locking violations, validation
//! failures (surfaced separately as flags, not raised - this variant exists
//! for call sites that must fail hard, e.g. bulk imports), processing and
//! collaborator failures, and invariant violations that indicate a bug in
//! the graph rather than bad input.

use thiserror::Error;

/// All possible errors returned from public domain methods.
#[derive(Error, Debug, Clone)]
pub enum CoreError {
    /// An entity with the requested identifier does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A lifecycle transition or mutation violates the state machine or a
    /// locking rule.
    #[error("not allowed: {0}")]
    NotAllowedAction(String),

    /// An attribute or item failed its schema predicate. Most validation
    /// outcomes are recorded as flags (see [`crate::validator`]); this
    /// variant is for call sites that must reject outright (e.g. rejecting
    /// an import batch with malformed schema references).
    #[error("validation failure: {0}")]
    ValidationFailure(String),

    /// A step in the image pipeline raised. Callers inside the pipeline
    /// absorb this into the image's `status_message` and a `*_FAILED`
    /// status rather than propagating it further.
    #[error("processing failure: {0}")]
    ProcessingFailure(String),

    /// A storage/codec/import collaborator raised. Treated as
    /// [`CoreError::ProcessingFailure`] inside the pipeline, as
    /// [`CoreError::NotAllowedAction`] elsewhere.
    #[error("collaborator failure: {0}")]
    CollaboratorFailure(String),

    /// A bug: the graph contains an edge the schema disallows, or an
    /// attribute's payload shape mismatches its declared variant. Never
    /// silently corrected.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

impl CoreError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn not_allowed(msg: impl Into<String>) -> Self {
        Self::NotAllowedAction(msg.into())
    }

    pub fn validation_failure(msg: impl Into<String>) -> Self {
        Self::ValidationFailure(msg.into())
    }

    pub fn processing_failure(msg: impl Into<String>) -> Self {
        Self::ProcessingFailure(msg.into())
    }

    pub fn collaborator_failure(msg: impl Into<String>) -> Self {
        Self::CollaboratorFailure(msg.into())
    }

    pub fn invariant_violation(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    /// Whether the condition can plausibly succeed on a bare retry.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CoreError::ProcessingFailure(_) | CoreError::CollaboratorFailure(_))
    }

    /// Coarse category, used for metrics and log fields.
    pub fn category(&self) -> &'static str {
        match self {
            CoreError::NotFound(_) => "not_found",
            CoreError::NotAllowedAction(_) => "not_allowed",
            CoreError::ValidationFailure(_) => "validation",
            CoreError::ProcessingFailure(_) => "processing",
            CoreError::CollaboratorFailure(_) => "collaborator",
            CoreError::InvariantViolation(_) => "invariant",
        }
    }
}

impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        CoreError::CollaboratorFailure(err.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::ValidationFailure(err.to_string())
    }
}
