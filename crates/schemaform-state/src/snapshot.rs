//! Committed snapshots and the draft a transition edits.

use crate::address::{get_at_path, value_or_null};
use crate::edit::{self, SelfHealing};
use crate::field_error::errors_under;
use crate::{FieldError, Op, Patch, Path, StateResult};
use serde::Serialize;
use serde_json::Value;

/// An immutable pair of document and validation result.
///
/// Snapshots are handed out as `Arc<Snapshot>`; a reader that holds one keeps
/// seeing exactly that state no matter how many transitions happen after.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Snapshot {
    value: Value,
    validation: Vec<FieldError>,
}

impl Snapshot {
    /// A snapshot with no validation errors.
    pub fn new(value: Value) -> Self {
        Self {
            value,
            validation: Vec::new(),
        }
    }

    #[inline]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The errors recorded by the last validation pass.
    #[inline]
    pub fn validation(&self) -> &[FieldError] {
        &self.validation
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.validation.is_empty()
    }

    /// Value at `path`, `None` if it cannot be resolved.
    #[inline]
    pub fn get(&self, path: &Path) -> Option<&Value> {
        get_at_path(&self.value, path)
    }

    /// Value at `path` with missing collapsed to `null`.
    #[inline]
    pub fn value_at(&self, path: &Path) -> &Value {
        value_or_null(&self.value, path)
    }

    /// Errors a control at `field` should display.
    pub fn errors_for(&self, field: &Path) -> Vec<&FieldError> {
        errors_under(&self.validation, field).collect()
    }
}

/// Mutable working copy handed to a transition's mutator.
///
/// The draft starts as a deep copy of the previous snapshot. Whatever the
/// mutator leaves in it becomes the next snapshot; the previous one is never
/// touched.
#[derive(Debug)]
pub struct Draft {
    value: Value,
    validation: Vec<FieldError>,
    healing: SelfHealing,
}

impl Draft {
    pub(crate) fn from_snapshot(previous: &Snapshot, healing: SelfHealing) -> Self {
        Self {
            value: previous.value.clone(),
            validation: previous.validation.clone(),
            healing,
        }
    }

    #[inline]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Raw access to the draft document for edits not covered by the
    /// operations below.
    #[inline]
    pub fn value_mut(&mut self) -> &mut Value {
        &mut self.value
    }

    #[inline]
    pub fn get(&self, path: &Path) -> Option<&Value> {
        get_at_path(&self.value, path)
    }

    /// See [`edit::set_value`].
    pub fn set_value(&mut self, path: &Path, value: Value) -> StateResult<()> {
        edit::set_value(&mut self.value, path, value, self.healing)
    }

    /// See [`edit::add_item`].
    pub fn add_item(&mut self, path: &Path, after: Option<usize>, value: Value) -> StateResult<()> {
        edit::add_item(&mut self.value, path, after, value)
    }

    /// See [`edit::remove_item`].
    pub fn remove_item(&mut self, path: &Path, index: usize) -> StateResult<()> {
        edit::remove_item(&mut self.value, path, index)
    }

    /// See [`edit::move_item`].
    pub fn move_item(&mut self, path: &Path, from: usize, to: usize) -> StateResult<()> {
        edit::move_item(&mut self.value, path, from, to)
    }

    pub fn apply(&mut self, op: &Op) -> StateResult<()> {
        edit::apply_op(&mut self.value, op, self.healing)
    }

    pub fn apply_patch(&mut self, patch: &Patch) -> StateResult<()> {
        patch.iter().try_for_each(|op| self.apply(op))
    }

    #[inline]
    pub fn validation(&self) -> &[FieldError] {
        &self.validation
    }

    /// Replace the validation result carried into the next snapshot.
    pub fn set_validation(&mut self, errors: Vec<FieldError>) {
        self.validation = errors;
    }

    pub(crate) fn finish(self) -> Snapshot {
        Snapshot {
            value: self.value,
            validation: self.validation,
        }
    }
}
