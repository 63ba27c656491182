// /////////////////////////////////////////////////////////////////////////////
// SlideTap Core
// Licensed under the Apache License, Version 2.0.
// /////////////////////////////////////////////////////////////////////////////

//! Unix process exit codes, scaled down from the teacher bootstrap's
//! `exit_code.rs` (BSD `sysexits.h`) to the handful of categories
//! `CoreError` actually distinguishes (spec §7).

use std::fmt;

use slidetap_domain::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum ExitCode {
    #[default]
    Success = 0,
    /// Command line usage error: missing/invalid arguments.
    UsageError = 64,
    /// `CoreError::ValidationFailure` or `CoreError::InvariantViolation`.
    DataError = 65,
    /// `CoreError::NotFound`.
    NoInput = 66,
    /// `CoreError::NotAllowedAction`.
    NoPerm = 77,
    /// `CoreError::ProcessingFailure` / `CoreError::CollaboratorFailure`.
    Unavailable = 69,
    /// Interrupted by SIGINT/SIGTERM before completing.
    Interrupted = 130,
    /// Anything else (config load failure, I/O error outside a `CoreError`).
    Software = 70,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn from_core_error(err: &CoreError) -> Self {
        match err {
            CoreError::NotFound(_) => ExitCode::NoInput,
            CoreError::NotAllowedAction(_) => ExitCode::NoPerm,
            CoreError::ValidationFailure(_) | CoreError::InvariantViolation(_) => ExitCode::DataError,
            CoreError::ProcessingFailure(_) | CoreError::CollaboratorFailure(_) => ExitCode::Unavailable,
        }
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({})", self, self.as_i32())
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code.as_i32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_no_input() {
        assert_eq!(ExitCode::from_core_error(&CoreError::not_found("x")), ExitCode::NoInput);
    }

    #[test]
    fn not_allowed_maps_to_no_perm() {
        assert_eq!(ExitCode::from_core_error(&CoreError::not_allowed("x")), ExitCode::NoPerm);
    }

    #[test]
    fn processing_failure_maps_to_unavailable() {
        assert_eq!(ExitCode::from_core_error(&CoreError::processing_failure("x")), ExitCode::Unavailable);
    }

    #[test]
    fn default_is_success() {
        assert_eq!(ExitCode::default(), ExitCode::Success);
    }
}
