//! Reading and writing values at a path inside a document.
//!
//! Reads are total: anything that cannot be resolved is `None`. Writes assume
//! the containers leading up to the target already exist and report a
//! [`StateError`] when they do not; creating missing parents is the job of the
//! edit operations in [`crate::edit`].

use crate::error::{value_type_name, StateError, StateResult};
use crate::{Path, Seg};
use serde_json::Value;

static NULL: Value = Value::Null;

/// Get a reference to the value at a path.
///
/// Returns `None` when a key is missing, an index is out of range, or a
/// segment tries to step into a scalar.
///
/// # Examples
///
/// ```
/// use schemaform_state::{get_at_path, path};
/// use serde_json::json;
///
/// let doc = json!({"a": {"b": [10, 20]}});
/// assert_eq!(get_at_path(&doc, &path!("a", "b", 1)), Some(&json!(20)));
/// assert_eq!(get_at_path(&doc, &path!("a", "x", "y")), None);
/// assert_eq!(get_at_path(&doc, &path!("a", "b", 1, "deeper")), None);
/// ```
pub fn get_at_path<'a>(doc: &'a Value, path: &Path) -> Option<&'a Value> {
    let mut current = doc;
    for seg in path.segments() {
        current = match (current, seg) {
            (Value::Object(obj), Seg::Key(key)) => obj.get(key)?,
            (Value::Object(obj), Seg::Index(idx)) => obj.get(&idx.to_string())?,
            (Value::Array(arr), Seg::Index(idx)) => arr.get(*idx)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Read a value, treating "not found" and explicit `null` the same way.
///
/// Controls use this to decide what to display: both cases render as empty.
pub fn value_or_null<'a>(doc: &'a Value, path: &Path) -> &'a Value {
    get_at_path(doc, path).unwrap_or(&NULL)
}

/// Whether a path holds a non-null value.
pub fn has_value(doc: &Value, path: &Path) -> bool {
    !value_or_null(doc, path).is_null()
}

/// Whether a value can hold children (object or array).
#[inline]
pub fn is_container(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

/// Get a mutable reference to the value at a path.
pub fn get_at_path_mut<'a>(doc: &'a mut Value, path: &Path) -> Option<&'a mut Value> {
    let mut current = doc;
    for seg in path.segments() {
        current = match (current, seg) {
            (Value::Object(obj), Seg::Key(key)) => obj.get_mut(key)?,
            (Value::Object(obj), Seg::Index(idx)) => obj.get_mut(&idx.to_string())?,
            (Value::Array(arr), Seg::Index(idx)) => arr.get_mut(*idx)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Write `value` at `path`, replacing whatever was there.
///
/// Every segment but the last must resolve to an existing container. The last
/// segment is assigned: object keys are inserted or replaced, array indices
/// are replaced in range and appended at `len`. The empty path replaces the
/// whole document.
///
/// # Errors
///
/// - [`StateError::PathNotFound`] if an intermediate key is missing.
/// - [`StateError::IndexOutOfBounds`] if an index lies past the end of its array.
/// - [`StateError::TypeMismatch`] if a segment steps into a scalar, or a key
///   segment addresses an array.
pub fn set_at_path(doc: &mut Value, path: &Path, value: Value) -> StateResult<()> {
    let Some((last, parents)) = path.segments().split_last() else {
        *doc = value;
        return Ok(());
    };
    let container = walk_mut(doc, parents, path)?;
    assign(container, last, value, path)
}

fn walk_mut<'a>(doc: &'a mut Value, segments: &[Seg], full_path: &Path) -> StateResult<&'a mut Value> {
    let mut current = doc;
    for (depth, seg) in segments.iter().enumerate() {
        current = match (current, seg) {
            (Value::Object(obj), Seg::Key(key)) => obj
                .get_mut(key)
                .ok_or_else(|| StateError::path_not_found(full_path.prefix(depth + 1)))?,
            (Value::Object(obj), Seg::Index(idx)) => obj
                .get_mut(&idx.to_string())
                .ok_or_else(|| StateError::path_not_found(full_path.prefix(depth + 1)))?,
            (Value::Array(arr), Seg::Index(idx)) => {
                let len = arr.len();
                arr.get_mut(*idx).ok_or_else(|| {
                    StateError::index_out_of_bounds(full_path.prefix(depth), *idx, len)
                })?
            }
            (Value::Array(_), Seg::Key(_)) => {
                return Err(StateError::type_mismatch(
                    full_path.prefix(depth),
                    "object",
                    "array",
                ));
            }
            (other, _) => {
                return Err(StateError::type_mismatch(
                    full_path.prefix(depth),
                    "object or array",
                    value_type_name(other),
                ));
            }
        };
    }
    Ok(current)
}

fn assign(container: &mut Value, seg: &Seg, value: Value, full_path: &Path) -> StateResult<()> {
    match (container, seg) {
        (Value::Object(obj), Seg::Key(key)) => {
            obj.insert(key.clone(), value);
            Ok(())
        }
        (Value::Object(obj), Seg::Index(idx)) => {
            obj.insert(idx.to_string(), value);
            Ok(())
        }
        (Value::Array(arr), Seg::Index(idx)) => {
            let len = arr.len();
            if *idx < len {
                arr[*idx] = value;
            } else if *idx == len {
                arr.push(value);
            } else {
                return Err(StateError::index_out_of_bounds(
                    full_path.parent_path(),
                    *idx,
                    len,
                ));
            }
            Ok(())
        }
        (Value::Array(_), Seg::Key(_)) => Err(StateError::type_mismatch(
            full_path.parent_path(),
            "object",
            "array",
        )),
        (other, _) => Err(StateError::type_mismatch(
            full_path.parent_path(),
            "object or array",
            value_type_name(other),
        )),
    }
}
