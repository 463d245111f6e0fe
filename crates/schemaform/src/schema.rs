//! Read-only inspection of the JSON Schema a form is built from.
//!
//! Only the handful of keywords the render tree needs are looked at here; the
//! full keyword set is the validator's business.

use crate::{FormError, FormResult};
use schemaform_state::{Path, Seg};
use serde::Serialize;
use serde_json::{Map, Value};

/// Declared kind of a schema node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    Object,
    Array,
    String,
    Number,
    Integer,
    Boolean,
    Null,
    /// No usable `type`; rendered as a free-form leaf.
    Any,
}

impl SchemaKind {
    /// Kind declared by `schema`.
    ///
    /// `type` may be a string or a list of strings; in a list the first
    /// non-`null` entry wins. Without `type`, `properties` implies an object
    /// and `items` implies an array.
    pub fn of(schema: &Value) -> Self {
        match schema.get("type") {
            Some(Value::String(name)) => Self::from_name(name),
            Some(Value::Array(names)) => names
                .iter()
                .filter_map(Value::as_str)
                .find(|name| *name != "null")
                .map(Self::from_name)
                .unwrap_or(SchemaKind::Null),
            _ if schema.get("properties").is_some() => SchemaKind::Object,
            _ if schema.get("items").is_some() => SchemaKind::Array,
            _ => SchemaKind::Any,
        }
    }

    fn from_name(name: &str) -> Self {
        match name {
            "object" => SchemaKind::Object,
            "array" => SchemaKind::Array,
            "string" => SchemaKind::String,
            "number" => SchemaKind::Number,
            "integer" => SchemaKind::Integer,
            "boolean" => SchemaKind::Boolean,
            "null" => SchemaKind::Null,
            _ => SchemaKind::Any,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SchemaKind::Object => "object",
            SchemaKind::Array => "array",
            SchemaKind::String => "string",
            SchemaKind::Number => "number",
            SchemaKind::Integer => "integer",
            SchemaKind::Boolean => "boolean",
            SchemaKind::Null => "null",
            SchemaKind::Any => "any",
        }
    }
}

/// Kind of the root schema, which must be an object or an array.
///
/// Only the explicit `type` keyword counts here.
pub fn root_kind(schema: &Value) -> FormResult<SchemaKind> {
    let declared = match schema.get("type") {
        Some(Value::String(name)) => name.as_str(),
        Some(other) => return Err(FormError::unsupported_type(other.to_string())),
        None => return Err(FormError::unsupported_type("none")),
    };
    match SchemaKind::from_name(declared) {
        kind @ (SchemaKind::Object | SchemaKind::Array) => Ok(kind),
        _ => Err(FormError::unsupported_type(declared)),
    }
}

/// `properties` of an object schema, in declaration order.
pub fn properties(schema: &Value) -> Option<&Map<String, Value>> {
    schema.get("properties").and_then(Value::as_object)
}

/// Schema of the element at `index` of an array schema.
///
/// Handles both the single-schema form of `items` and the tuple form, where
/// positions past the tuple fall back to `additionalItems`.
pub fn item_schema(schema: &Value, index: usize) -> Option<&Value> {
    match schema.get("items")? {
        Value::Array(tuple) => tuple
            .get(index)
            .or_else(|| schema.get("additionalItems").filter(|v| v.is_object())),
        single => Some(single),
    }
}

/// Whether `name` is listed in the schema's `required` array.
pub fn is_required(schema: &Value, name: &str) -> bool {
    schema
        .get("required")
        .and_then(Value::as_array)
        .is_some_and(|names| names.iter().any(|n| n.as_str() == Some(name)))
}

pub fn title(schema: &Value) -> Option<&str> {
    schema.get("title").and_then(Value::as_str)
}

pub fn description(schema: &Value) -> Option<&str> {
    schema.get("description").and_then(Value::as_str)
}

/// Sub-schema describing the value at `path`, walking `properties` for keys
/// and `items` for indices.
pub fn schema_at<'a>(schema: &'a Value, path: &Path) -> Option<&'a Value> {
    path.iter().try_fold(schema, |node, seg| match seg {
        Seg::Key(key) => properties(node)?.get(key),
        Seg::Index(index) => item_schema(node, *index),
    })
}

/// Value a new array element starts with: the item schema's `default`, or `{}`.
pub fn new_item_value(item: Option<&Value>) -> Value {
    item.and_then(|s| s.get("default"))
        .cloned()
        .unwrap_or_else(|| Value::Object(Map::new()))
}
