//! Path-addressed immutable document store for schema-driven forms.
//!
//! `schemaform-state` keeps one JSON document and its validation result as an
//! immutable [`Snapshot`]. Controls address the document by [`Path`] and
//! change it only through store transitions, so a snapshot that has been
//! handed out is never modified afterwards.
//!
//! # Core Concepts
//!
//! - **Path**: keys and indices locating a value; controls hold nothing else
//! - **get_at_path / set_at_path**: total reads, precondition-checked writes
//! - **Edit operations**: set with parent healing, insert/remove/move array items
//! - **FormStore**: current snapshot plus the `transition` primitive
//! - **Op / Patch**: serializable edits, batched into one transition
//!
//! # Transitions
//!
//! ```text
//! Snapshot' = freeze(mutator(draft_of(Snapshot)))
//! ```
//!
//! - The draft is a deep copy of the previous document. Forms are small, so
//!   copy-on-write by cloning keeps snapshots fully independent at a cost
//!   proportional to the document size per edit.
//! - A failed mutator commits nothing and notifies nobody.
//! - The change listener runs once per committed transition, after the
//!   commit, unless change buffering is on.
//!
//! # Quick Start
//!
//! ```
//! use schemaform_state::{FormStore, path};
//! use serde_json::json;
//!
//! let store = FormStore::new(json!({"rows": ["A", "B", "C"]}));
//!
//! store.set_value_by_path(&path!("owner", "name"), "Alice").unwrap();
//! store.add_array_item_by_path(&path!("rows"), Some(1), Some(json!("x"))).unwrap();
//! store.delete_array_item_by_path(&path!("rows"), 0).unwrap();
//!
//! assert_eq!(
//!     store.value(),
//!     json!({"rows": ["B", "x", "C"], "owner": {"name": "Alice"}})
//! );
//! ```

mod address;
mod edit;
mod error;
mod field_error;
mod op;
mod patch;
mod path;
mod snapshot;
mod store;

pub use address::{get_at_path, get_at_path_mut, has_value, is_container, set_at_path, value_or_null};
pub use edit::{add_item, apply_op, apply_patch, move_item, remove_item, set_value, SelfHealing};
pub use error::{value_type_name, StateError, StateResult};
pub use field_error::{errors_under, FieldError};
pub use op::Op;
pub use patch::Patch;
pub use path::{Path, Seg};
pub use snapshot::{Draft, Snapshot};
pub use store::{ChangeListener, FormStore, FormStoreBuilder, StoreOptions};

pub use serde_json::Value;
