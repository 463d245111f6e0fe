//! Ordered batches of edits.
//!
//! A `Patch` is applied inside a single store transition: all of its
//! operations land in one snapshot and produce one change notification.

use crate::Op;
use serde::{Deserialize, Serialize};

/// Edits applied in order, all inside one transition.
///
/// Serialized as a bare JSON array of [`Op`]s, which is the format edit
/// scripts are written in.
///
/// ```
/// use schemaform_state::{Patch, Op, path};
/// use serde_json::json;
///
/// let patch = Patch::new()
///     .with_op(Op::set(path!("owner"), json!("Alice")))
///     .with_op(Op::push_item(path!("rows"), json!("x")));
/// assert_eq!(serde_json::to_value(&patch).unwrap()[1]["op"], "add_item");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Patch {
    ops: Vec<Op>,
}

impl Patch {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_ops(ops: Vec<Op>) -> Self {
        Self { ops }
    }

    #[must_use]
    pub fn with_op(mut self, op: Op) -> Self {
        self.ops.push(op);
        self
    }

    #[inline]
    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Op> {
        self.ops.iter()
    }
}

impl FromIterator<Op> for Patch {
    fn from_iter<I: IntoIterator<Item = Op>>(ops: I) -> Self {
        Self::with_ops(ops.into_iter().collect())
    }
}
