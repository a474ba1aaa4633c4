//! Error types for the JavaScript adapter.

use modshift_core::edit::EditError;
use modshift_core::error::ModshiftError;
use thiserror::Error;

use crate::registry::RegistryError;

/// Errors that can occur while parsing or editing a JavaScript module.
#[derive(Debug, Error)]
pub enum JsError {
    /// The tree-sitter grammar could not be loaded.
    #[error("failed to load JavaScript grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),

    /// The parser returned no tree.
    #[error("parser produced no syntax tree")]
    NoTree,

    /// The source contains syntax errors.
    #[error("parse error at {line}:{col}: {message}")]
    Parse { line: u32, col: u32, message: String },

    /// Span edits could not be applied.
    #[error("edit error: {0}")]
    Edit(#[from] EditError),

    /// A declaration editing operation was misused.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Result type for JavaScript adapter operations.
pub type JsResult<T> = Result<T, JsError>;


// ============================================================================
// Bridge: JsError -> ModshiftError
// ============================================================================

impl From<JsError> for ModshiftError {
    fn from(err: JsError) -> Self {
        match err {
            JsError::Parse { line, col, message } => ModshiftError::Parse { line, col, message },
            JsError::Edit(edit_err) => ModshiftError::Edit(edit_err),
            JsError::Registry(registry_err) => ModshiftError::from(registry_err),
            JsError::Language(lang_err) => ModshiftError::internal(lang_err.to_string()),
            JsError::NoTree => ModshiftError::internal("parser produced no syntax tree"),
        }
    }
}

// ============================================================================
// Bridge: RegistryError -> ModshiftError
// ============================================================================

impl From<RegistryError> for ModshiftError {
    fn from(err: RegistryError) -> Self {
        ModshiftError::invalid_args(err.to_string())
    }
}
