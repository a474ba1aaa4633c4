//! Error types and error code constants for modshift.
//!
//! `ModshiftError` is the unified error type handed to host tooling. Language
//! adapters keep their own error enums; the root crate bridges them into
//! `ModshiftError` with `From` impls.
//!
//! ## Error Code Mapping
//!
//! - `2`: Invalid arguments (caller asked for something the tree cannot do)
//! - `3`: Parse errors (malformed source)
//! - `4`: Edit errors (span edits could not be applied)
//! - `10`: Internal errors (bugs, unexpected state)

use std::fmt;

use thiserror::Error;

use crate::edit::EditError;

// ============================================================================
// Error Codes
// ============================================================================

/// Stable numeric codes for host tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ErrorCode {
    /// Invalid arguments from caller.
    InvalidArguments = 2,
    /// Source text could not be parsed.
    ParseError = 3,
    /// Edits could not be applied to the source.
    EditError = 4,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl ErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for modshift operations.
#[derive(Debug, Error)]
pub enum ModshiftError {
    /// Invalid arguments from caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    /// Source text failed to parse.
    #[error("parse error at {line}:{col}: {message}")]
    Parse { line: u32, col: u32, message: String },

    /// Span edits could not be applied.
    #[error("edit error: {0}")]
    Edit(#[from] EditError),

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl From<&ModshiftError> for ErrorCode {
    fn from(err: &ModshiftError) -> Self {
        match err {
            ModshiftError::InvalidArguments { .. } => ErrorCode::InvalidArguments,
            ModshiftError::Parse { .. } => ErrorCode::ParseError,
            ModshiftError::Edit(_) => ErrorCode::EditError,
            ModshiftError::Internal { .. } => ErrorCode::InternalError,
        }
    }
}

impl ModshiftError {
    /// Create an invalid arguments error.
    pub fn invalid_args(message: impl Into<String>) -> Self {
        ModshiftError::InvalidArguments {
            message: message.into(),
        }
    }

    /// Create a parse error.
    pub fn parse(line: u32, col: u32, message: impl Into<String>) -> Self {
        ModshiftError::Parse {
            line,
            col,
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ModshiftError::Internal {
            message: message.into(),
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> ErrorCode {
        ErrorCode::from(self)
    }
}

/// Result type for modshift operations.
pub type ModshiftResult<T> = Result<T, ModshiftError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Span;

    mod error_code_mapping {
        use super::*;

        #[test]
        fn invalid_arguments_maps_to_two() {
            let err = ModshiftError::invalid_args("not a module declaration");
            assert_eq!(err.error_code(), ErrorCode::InvalidArguments);
            assert_eq!(err.error_code().code(), 2);
        }

        #[test]
        fn parse_maps_to_three() {
            let err = ModshiftError::parse(1, 9, "unexpected `)`");
            assert_eq!(err.error_code().code(), 3);
        }

        #[test]
        fn edit_maps_to_four() {
            let err = ModshiftError::from(EditError::SpanOutOfBounds {
                span: Span::new(0, 10),
                source_len: 3,
            });
            assert_eq!(err.error_code(), ErrorCode::EditError);
            assert_eq!(err.error_code().code(), 4);
        }

        #[test]
        fn internal_maps_to_ten() {
            assert_eq!(ModshiftError::internal("boom").error_code().code(), 10);
        }
    }

    mod error_display {
        use super::*;

        #[test]
        fn parse_display_includes_position() {
            let err = ModshiftError::parse(2, 5, "missing `)`");
            assert_eq!(err.to_string(), "parse error at 2:5: missing `)`");
        }

        #[test]
        fn edit_display_wraps_inner_error() {
            let err = ModshiftError::from(EditError::SpanOutOfBounds {
                span: Span::new(2, 9),
                source_len: 4,
            });
            assert_eq!(
                err.to_string(),
                "edit error: span [2, 9) is out of bounds for source of length 4"
            );
        }

        #[test]
        fn code_display_is_numeric() {
            assert_eq!(ErrorCode::ParseError.to_string(), "3");
        }
    }
}
