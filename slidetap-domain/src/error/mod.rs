//! Domain error taxonomy.
//!
//! The domain never panics or raises exceptions for expected failure modes;
//! it returns a [`CoreError`] that callers match on. Validation results are a
//! separate concern (see [`crate::validator`]) and are represented as plain
//! booleans and diagnostic collections rather than errors, since a non-valid
//! item is not a failure of the validator.

mod core_error;

pub use core_error::CoreError;

/// Convenience alias used throughout the domain crate.
pub type CoreResult<T> = Result<T, CoreError>;
