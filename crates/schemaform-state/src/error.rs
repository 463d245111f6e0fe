//! Error types for schemaform-state operations.

use crate::Path;
use serde_json::Value;
use thiserror::Error;

/// Result type alias for schemaform-state operations.
pub type StateResult<T> = Result<T, StateError>;

/// Errors raised by path writes, edit operations and store transitions.
///
/// Reads never fail: a missing path is `None`. Every variant here is either a
/// precondition violation by the caller or a rejected transition.
#[derive(Debug, Error)]
pub enum StateError {
    /// A container on the way to the target is missing.
    #[error("path not found: {path}")]
    PathNotFound { path: Path },

    /// `path` addresses an array of `len` elements; `index` is past its end.
    #[error("index {index} out of bounds (len: {len}) at path {path}")]
    IndexOutOfBounds { path: Path, index: usize, len: usize },

    /// The value at `path` has the wrong shape for the edit.
    #[error("type mismatch at {path}: expected {expected}, found {found}")]
    TypeMismatch {
        path: Path,
        expected: &'static str,
        found: &'static str,
    },

    /// A dotted path string could not be parsed.
    #[error("invalid path `{input}`: {reason}")]
    InvalidPath { input: String, reason: &'static str },

    /// `transition` was called from inside another transition's mutator.
    #[error("transition started while another transition is in progress")]
    NestedTransition,

    /// The edit makes no sense for the addressed field.
    #[error("invalid operation: {message}")]
    InvalidOperation { message: String },
}

impl StateError {
    #[inline]
    pub fn path_not_found(path: Path) -> Self {
        StateError::PathNotFound { path }
    }

    #[inline]
    pub fn index_out_of_bounds(path: Path, index: usize, len: usize) -> Self {
        StateError::IndexOutOfBounds { path, index, len }
    }

    #[inline]
    pub fn type_mismatch(path: Path, expected: &'static str, found: &'static str) -> Self {
        StateError::TypeMismatch {
            path,
            expected,
            found,
        }
    }

    #[inline]
    pub fn invalid_path(input: impl Into<String>, reason: &'static str) -> Self {
        StateError::InvalidPath {
            input: input.into(),
            reason,
        }
    }

    #[inline]
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        StateError::InvalidOperation {
            message: message.into(),
        }
    }
}

/// JSON type name of `value`, as used in error messages.
pub fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
