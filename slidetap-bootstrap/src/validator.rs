// /////////////////////////////////////////////////////////////////////////////
// SlideTap Core
// Licensed under the Apache License, Version 2.0.
// /////////////////////////////////////////////////////////////////////////////

//! Argument validation, scaled down from the teacher bootstrap's
//! `cli/validator.rs`: this engine takes file/directory paths rather than
//! untrusted shell arguments, so validation is limited to existence and
//! shape checks rather than the teacher's injection-pattern scanning.

use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{label} path does not exist: {path}")]
    NotFound { label: &'static str, path: String },

    #[error("{label} path is not a {expected}: {path}")]
    WrongKind { label: &'static str, expected: &'static str, path: String },
}

pub fn require_file(label: &'static str, path: &Path) -> Result<(), ValidationError> {
    if !path.exists() {
        return Err(ValidationError::NotFound {
            label,
            path: path.display().to_string(),
        });
    }
    if !path.is_file() {
        return Err(ValidationError::WrongKind {
            label,
            expected: "file",
            path: path.display().to_string(),
        });
    }
    Ok(())
}

pub fn require_directory(label: &'static str, path: &Path) -> Result<(), ValidationError> {
    if !path.exists() {
        return Err(ValidationError::NotFound {
            label,
            path: path.display().to_string(),
        });
    }
    if !path.is_dir() {
        return Err(ValidationError::WrongKind {
            label,
            expected: "directory",
            path: path.display().to_string(),
        });
    }
    Ok(())
}
