//! Field-level validation errors as stored in a snapshot.

use crate::Path;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// One schema violation, located at the field it concerns.
///
/// On the wire the path is written in dotted form (`user.name`), which is what
/// consumers display and match against. Keys that would be ambiguous there
/// are bracket-quoted, so the form parses back to the same path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    /// Location of the offending value.
    #[serde(serialize_with = "path_to_dotted", deserialize_with = "path_from_dotted")]
    pub path: Path,
    /// Schema keyword that failed (`required`, `type`, `minLength`, ...).
    pub keyword: String,
    /// Human-readable message from the validator.
    pub message: String,
    /// Keyword-specific details, e.g. `missingProperty` for `required`.
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl FieldError {
    pub fn new(path: Path, keyword: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path,
            keyword: keyword.into(),
            message: message.into(),
            params: Map::new(),
        }
    }

    /// Add a parameter (builder pattern).
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Name of the absent property for a `required` error.
    pub fn missing_property(&self) -> Option<&str> {
        self.params.get("missingProperty").and_then(Value::as_str)
    }

    /// Whether a control rendered at `field` should show this error.
    ///
    /// True when the error sits at the field itself or anywhere below it.
    #[inline]
    pub fn applies_to(&self, field: &Path) -> bool {
        self.path.starts_with(field)
    }
}

/// Errors that a control at `field` should display, in report order.
pub fn errors_under<'a, 'p>(
    errors: &'a [FieldError],
    field: &'p Path,
) -> impl Iterator<Item = &'a FieldError> + 'p
where
    'a: 'p,
{
    errors.iter().filter(move |e| e.applies_to(field))
}

fn path_to_dotted<S: Serializer>(path: &Path, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(path)
}

fn path_from_dotted<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Path, D::Error> {
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
}
