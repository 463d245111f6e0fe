//! Edit operations on a form document.
//!
//! Each operation is one structural edit issued by a control. Operations are
//! serializable so an edit script can be recorded or replayed from JSON.

use crate::Path;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

fn empty_object() -> Value {
    Value::Object(Map::new())
}

/// A single edit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Op {
    /// Set a value at the path.
    ///
    /// A missing or non-container parent is replaced with `{}` first, as far
    /// up as the store's self-healing policy allows.
    Set {
        path: Path,
        value: Value,
    },

    /// Insert into the array at the path.
    ///
    /// Without `after` the value is appended; otherwise it lands right after
    /// position `after`.
    AddItem {
        path: Path,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        after: Option<usize>,
        #[serde(default = "empty_object")]
        value: Value,
    },

    /// Remove exactly one element from the array at the path.
    RemoveItem {
        path: Path,
        index: usize,
    },

    /// Relocate one element of the array at the path.
    MoveItem {
        path: Path,
        /// Current position of the element.
        from: usize,
        /// Position the element ends up at.
        to: usize,
    },
}

impl Op {
    #[inline]
    pub fn set(path: Path, value: impl Into<Value>) -> Self {
        Op::Set {
            path,
            value: value.into(),
        }
    }

    /// Append `value` to the array at `path`.
    #[inline]
    pub fn push_item(path: Path, value: impl Into<Value>) -> Self {
        Op::AddItem {
            path,
            after: None,
            value: value.into(),
        }
    }

    /// Insert `value` right after position `after`.
    #[inline]
    pub fn insert_item_after(path: Path, after: usize, value: impl Into<Value>) -> Self {
        Op::AddItem {
            path,
            after: Some(after),
            value: value.into(),
        }
    }

    #[inline]
    pub fn remove_item(path: Path, index: usize) -> Self {
        Op::RemoveItem { path, index }
    }

    #[inline]
    pub fn move_item(path: Path, from: usize, to: usize) -> Self {
        Op::MoveItem { path, from, to }
    }

    /// Path of the edited value or array.
    #[inline]
    pub fn path(&self) -> &Path {
        match self {
            Op::Set { path, .. } => path,
            Op::AddItem { path, .. } => path,
            Op::RemoveItem { path, .. } => path,
            Op::MoveItem { path, .. } => path,
        }
    }

    /// The `op` tag this operation serializes with.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Op::Set { .. } => "set",
            Op::AddItem { .. } => "add_item",
            Op::RemoveItem { .. } => "remove_item",
            Op::MoveItem { .. } => "move_item",
        }
    }
}
