//! The structural edits a form can perform.
//!
//! These functions mutate a document in place. They are used on a store
//! draft during a transition, never on a committed snapshot. `apply_patch` is
//! the pure variant that clones first.

use crate::address::{get_at_path, get_at_path_mut, is_container, set_at_path};
use crate::error::{value_type_name, StateError, StateResult};
use crate::{Op, Patch, Path};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// How far `set_value` goes when the target's containers are missing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelfHealing {
    /// Materialize only the immediate parent. A gap two or more levels up is
    /// reported as [`StateError::PathNotFound`].
    #[default]
    Parent,
    /// Materialize every missing ancestor, shallowest first.
    Ancestors,
}

/// Set `value` at `path`, creating the parent container first if needed.
///
/// A parent that is missing, `null` or a scalar is replaced by `{}`. Arrays
/// and objects are kept as they are.
///
/// # Examples
///
/// ```
/// use schemaform_state::{set_value, path, SelfHealing};
/// use serde_json::json;
///
/// let mut doc = json!({});
/// set_value(&mut doc, &path!("a", "b"), json!(1), SelfHealing::Parent).unwrap();
/// assert_eq!(doc, json!({"a": {"b": 1}}));
/// ```
pub fn set_value(doc: &mut Value, path: &Path, value: Value, healing: SelfHealing) -> StateResult<()> {
    if path.len() > 1 {
        match healing {
            SelfHealing::Parent => ensure_container(doc, &path.parent_path())?,
            SelfHealing::Ancestors => {
                for depth in 1..path.len() {
                    ensure_container(doc, &path.prefix(depth))?;
                }
            }
        }
    }
    set_at_path(doc, path, value)
}

fn ensure_container(doc: &mut Value, path: &Path) -> StateResult<()> {
    if get_at_path(doc, path).is_some_and(is_container) {
        return Ok(());
    }
    set_at_path(doc, path, Value::Object(Map::new()))
}

/// Insert into the array at `path`.
///
/// `after: None` appends. `after: Some(i)` inserts at `i + 1`; positions past
/// the end append.
pub fn add_item(doc: &mut Value, path: &Path, after: Option<usize>, value: Value) -> StateResult<()> {
    let items = array_at(doc, path)?;
    match after {
        None => items.push(value),
        Some(i) => {
            let at = i.saturating_add(1).min(items.len());
            items.insert(at, value);
        }
    }
    Ok(())
}

/// Remove the element at `index` from the array at `path`.
pub fn remove_item(doc: &mut Value, path: &Path, index: usize) -> StateResult<()> {
    let items = array_at(doc, path)?;
    if index >= items.len() {
        return Err(StateError::index_out_of_bounds(
            path.clone(),
            index,
            items.len(),
        ));
    }
    items.remove(index);
    Ok(())
}

/// Move the element at `from` to position `to` in the array at `path`.
///
/// The array is read before any change, reordered as a whole and written back
/// in one assignment. Elements between `from` and `to` shift by one; `to`
/// past the end moves the element last.
pub fn move_item(doc: &mut Value, path: &Path, from: usize, to: usize) -> StateResult<()> {
    let mut items = match get_at_path(doc, path) {
        Some(Value::Array(items)) => items.clone(),
        Some(other) => {
            return Err(StateError::type_mismatch(
                path.clone(),
                "array",
                value_type_name(other),
            ));
        }
        None => return Err(StateError::path_not_found(path.clone())),
    };
    if from >= items.len() {
        return Err(StateError::index_out_of_bounds(
            path.clone(),
            from,
            items.len(),
        ));
    }
    let item = items.remove(from);
    let to = to.min(items.len());
    items.insert(to, item);
    set_at_path(doc, path, Value::Array(items))
}

fn array_at<'a>(doc: &'a mut Value, path: &Path) -> StateResult<&'a mut Vec<Value>> {
    match get_at_path_mut(doc, path) {
        Some(Value::Array(items)) => Ok(items),
        Some(other) => Err(StateError::type_mismatch(
            path.clone(),
            "array",
            value_type_name(other),
        )),
        None => Err(StateError::path_not_found(path.clone())),
    }
}

/// Apply a single operation to a document (mutating).
pub fn apply_op(doc: &mut Value, op: &Op, healing: SelfHealing) -> StateResult<()> {
    match op {
        Op::Set { path, value } => set_value(doc, path, value.clone(), healing),
        Op::AddItem { path, after, value } => add_item(doc, path, *after, value.clone()),
        Op::RemoveItem { path, index } => remove_item(doc, path, *index),
        Op::MoveItem { path, from, to } => move_item(doc, path, *from, *to),
    }
}

/// Apply a patch to a document (pure function).
///
/// The input is left untouched; on error no partial result escapes.
///
/// ```
/// use schemaform_state::{apply_patch, Op, Patch, path, SelfHealing};
/// use serde_json::json;
///
/// let doc = json!({"rows": ["a", "b", "c"]});
/// let patch = Patch::new().with_op(Op::move_item(path!("rows"), 0, 2));
///
/// let next = apply_patch(&doc, &patch, SelfHealing::Parent).unwrap();
/// assert_eq!(next["rows"], json!(["b", "c", "a"]));
/// assert_eq!(doc["rows"], json!(["a", "b", "c"]));
/// ```
pub fn apply_patch(doc: &Value, patch: &Patch, healing: SelfHealing) -> StateResult<Value> {
    let mut result = doc.clone();
    for op in patch.iter() {
        apply_op(&mut result, op, healing)?;
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path;
    use serde_json::json;

    #[test]
    fn test_set_value_heals_missing_parent() {
        let mut doc = json!({});
        set_value(&mut doc, &path!("a", "b"), json!("v"), SelfHealing::Parent).unwrap();
        assert_eq!(doc, json!({"a": {"b": "v"}}));
    }

    #[test]
    fn test_set_value_replaces_scalar_and_null_parent() {
        let mut doc = json!({"a": "text", "b": null});
        set_value(&mut doc, &path!("a", "x"), json!(1), SelfHealing::Parent).unwrap();
        set_value(&mut doc, &path!("b", "y"), json!(2), SelfHealing::Parent).unwrap();
        assert_eq!(doc, json!({"a": {"x": 1}, "b": {"y": 2}}));
    }

    #[test]
    fn test_set_value_keeps_existing_parent() {
        let mut doc = json!({"user": {"name": "Alice", "age": 30}});
        set_value(&mut doc, &path!("user", "name"), json!("Bob"), SelfHealing::Parent).unwrap();
        assert_eq!(doc, json!({"user": {"name": "Bob", "age": 30}}));
    }

    #[test]
    fn test_set_value_keeps_array_parent() {
        let mut doc = json!({"tags": ["a", "b"]});
        set_value(&mut doc, &path!("tags", 1), json!("z"), SelfHealing::Parent).unwrap();
        assert_eq!(doc["tags"], json!(["a", "z"]));
    }

    #[test]
    fn test_parent_healing_stops_at_one_level() {
        let mut doc = json!({});
        let err = set_value(&mut doc, &path!("a", "b", "c"), json!(1), SelfHealing::Parent)
            .unwrap_err();
        assert!(matches!(err, StateError::PathNotFound { .. }));
    }

    #[test]
    fn test_ancestor_healing_builds_whole_chain() {
        let mut doc = json!({"a": 3});
        set_value(&mut doc, &path!("a", "b", "c"), json!(1), SelfHealing::Ancestors).unwrap();
        assert_eq!(doc, json!({"a": {"b": {"c": 1}}}));
    }

    #[test]
    fn test_add_item_after_and_append() {
        let mut doc = json!({"list": ["A", "B", "C"]});
        add_item(&mut doc, &path!("list"), Some(1), json!("x")).unwrap();
        assert_eq!(doc["list"], json!(["A", "B", "x", "C"]));

        let mut doc = json!({"list": ["A", "B"]});
        add_item(&mut doc, &path!("list"), None, json!("x")).unwrap();
        assert_eq!(doc["list"], json!(["A", "B", "x"]));
    }

    #[test]
    fn test_add_item_past_end_appends() {
        let mut doc = json!({"list": ["A"]});
        add_item(&mut doc, &path!("list"), Some(10), json!("x")).unwrap();
        assert_eq!(doc["list"], json!(["A", "x"]));
    }

    #[test]
    fn test_add_item_requires_array() {
        let mut doc = json!({"list": {"not": "array"}});
        let err = add_item(&mut doc, &path!("list"), None, json!({})).unwrap_err();
        assert!(matches!(
            err,
            StateError::TypeMismatch { expected: "array", found: "object", .. }
        ));

        let err = add_item(&mut doc, &path!("missing"), None, json!({})).unwrap_err();
        assert!(matches!(err, StateError::PathNotFound { .. }));
    }

    #[test]
    fn test_remove_item() {
        let mut doc = json!({"list": ["A", "B", "C"]});
        remove_item(&mut doc, &path!("list"), 1).unwrap();
        assert_eq!(doc["list"], json!(["A", "C"]));
    }

    #[test]
    fn test_remove_item_out_of_range_leaves_array() {
        let mut doc = json!({"list": ["A", "B"]});
        let err = remove_item(&mut doc, &path!("list"), 2).unwrap_err();
        assert!(matches!(err, StateError::IndexOutOfBounds { index: 2, len: 2, .. }));
        assert_eq!(doc["list"], json!(["A", "B"]));
    }

    #[test]
    fn test_move_item_both_directions() {
        let mut doc = json!(["A", "B", "C"]);
        move_item(&mut doc, &Path::root(), 0, 2).unwrap();
        assert_eq!(doc, json!(["B", "C", "A"]));

        let mut doc = json!(["A", "B", "C"]);
        move_item(&mut doc, &Path::root(), 2, 0).unwrap();
        assert_eq!(doc, json!(["C", "A", "B"]));
    }

    #[test]
    fn test_move_item_keeps_length() {
        let mut doc = json!({"rows": [1, 2, 3, 4, 5]});
        move_item(&mut doc, &path!("rows"), 1, 3).unwrap();
        assert_eq!(doc["rows"], json!([1, 3, 4, 2, 5]));
        move_item(&mut doc, &path!("rows"), 4, 99).unwrap();
        assert_eq!(doc["rows"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn test_move_item_bad_source() {
        let mut doc = json!({"rows": [1]});
        let err = move_item(&mut doc, &path!("rows"), 3, 0).unwrap_err();
        assert!(matches!(err, StateError::IndexOutOfBounds { index: 3, .. }));
    }

    #[test]
    fn test_apply_patch_is_pure() {
        let doc = json!({"x": 1});
        let patch = Patch::new().with_op(Op::set(path!("x"), json!(2)));
        let next = apply_patch(&doc, &patch, SelfHealing::Parent).unwrap();
        assert_eq!(next["x"], 2);
        assert_eq!(doc["x"], 1);
    }
}
