//! Schema-driven forms over a path-addressed immutable store.
//!
//! A [`FormShell`] takes a JSON Schema whose root is an object or an array,
//! keeps the document in a [`FormStore`](schemaform_state::FormStore), and
//! hands every rendered control a [`FieldHandle`]: the control's own path plus
//! a clone of the shared [`FormController`]. Controls read and edit through
//! that handle only.
//!
//! # Flow
//!
//! 1. A control reads its value by path from the current snapshot.
//! 2. An edit runs one store transition and the owner's `on_change` sees the
//!    new document, unless submit buffering is on.
//! 3. On blur the [`ValidationCoordinator`] validates the whole document and
//!    commits the normalized errors; `on_blur` runs afterwards.
//! 4. Each control shows the errors located at or below its path.
//!
//! Edits never trigger validation, so errors stay as they were until the next
//! blur.

mod controller;
mod error;
mod locale;
mod options;
pub mod render;
pub mod schema;
mod shell;
pub mod validation;

pub use controller::{BlurHook, FieldHandle, FormController};
pub use error::{FormError, FormResult};
pub use locale::{Locale, UiText};
pub use options::FormOptions;
pub use render::{ArrayForm, FieldAction, FieldNode, LeafField, ObjectForm, RenderStrategy};
pub use schema::SchemaKind;
pub use shell::{FormShell, FormShellBuilder};
pub use validation::{
    JsonSchemaValidator, RawValidationError, SchemaValidator, ValidationCoordinator,
    ValidationOutcome,
};
