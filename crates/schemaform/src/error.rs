//! Error types for form construction and form-level operations.

use schemaform_state::StateError;
use thiserror::Error;

/// Result type alias for schemaform operations.
pub type FormResult<T> = Result<T, FormError>;

/// Errors raised while building or driving a form.
///
/// Invalid documents are not errors: they show up as
/// [`FieldError`](schemaform_state::FieldError)s in the snapshot.
#[derive(Debug, Error)]
pub enum FormError {
    /// The root schema declares a type no form strategy renders.
    #[error("unsupported root schema type: {found}")]
    UnsupportedType {
        /// The declared type, or `none` when the schema has no `type`.
        found: String,
    },

    /// The schema could not be compiled into a validator.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    /// An edit or transition was rejected by the store.
    #[error(transparent)]
    State(#[from] StateError),
}

impl FormError {
    #[inline]
    pub fn unsupported_type(found: impl Into<String>) -> Self {
        FormError::UnsupportedType {
            found: found.into(),
        }
    }

    #[inline]
    pub fn invalid_schema(message: impl Into<String>) -> Self {
        FormError::InvalidSchema(message.into())
    }
}
