//! Blur-triggered validation of the whole document.
//!
//! The coordinator runs a [`SchemaValidator`] against the current snapshot,
//! normalizes what it reports into [`FieldError`]s located at full field
//! paths, and commits the list into the store. Edits never validate; the list
//! a snapshot carries is whatever the last blur produced.

use crate::{FormError, FormResult};
use jsonschema::error::ValidationErrorKind;
use schemaform_state::{FieldError, FormStore, Path, Seg, Value};
use serde::Serialize;
use serde_json::Map;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// One violation as reported by a validator, before normalization.
#[derive(Clone, Debug, PartialEq)]
pub struct RawValidationError {
    /// Location of the offending value inside the validated document.
    pub instance_path: Path,
    pub keyword: String,
    pub message: String,
    pub params: Map<String, Value>,
}

impl RawValidationError {
    pub fn new(instance_path: Path, keyword: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            instance_path,
            keyword: keyword.into(),
            message: message.into(),
            params: Map::new(),
        }
    }

    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

/// Validates a whole document; an empty result means valid.
pub trait SchemaValidator: Send + Sync {
    fn validate(&self, document: &Value) -> Vec<RawValidationError>;
}

/// [`SchemaValidator`] backed by a compiled `jsonschema::Validator`.
pub struct JsonSchemaValidator {
    validator: jsonschema::Validator,
}

impl JsonSchemaValidator {
    /// Compile `schema`.
    ///
    /// # Errors
    ///
    /// [`FormError::InvalidSchema`] when the schema itself is malformed.
    pub fn new(schema: &Value) -> FormResult<Self> {
        let validator = jsonschema::Validator::new(schema)
            .map_err(|e| FormError::invalid_schema(e.to_string()))?;
        Ok(Self { validator })
    }
}

impl SchemaValidator for JsonSchemaValidator {
    fn validate(&self, document: &Value) -> Vec<RawValidationError> {
        self.validator
            .iter_errors(document)
            .map(|error| {
                let pointer = error.instance_path.to_string();
                let schema_path = error.schema_path.to_string();
                let message = error.to_string();
                let instance_path = pointer_to_path(document, &pointer);
                match &error.kind {
                    ValidationErrorKind::Required { property } => {
                        let name = match property {
                            Value::String(name) => Value::String(name.clone()),
                            other => Value::String(other.to_string()),
                        };
                        RawValidationError::new(instance_path, "required", message)
                            .with_param("missingProperty", name)
                    }
                    _ => RawValidationError::new(instance_path, keyword_of(&schema_path), message),
                }
            })
            .collect()
    }
}

impl fmt::Debug for JsonSchemaValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonSchemaValidator").finish_non_exhaustive()
    }
}

/// Failing keyword: the last token of the schema location.
fn keyword_of(schema_path: &str) -> String {
    schema_path
        .rsplit('/')
        .next()
        .map(unescape_token)
        .unwrap_or_default()
}

/// Resolve a JSON pointer into a typed [`Path`] against `document`.
///
/// A token is an index only where the document holds an array at that point,
/// so an object key that happens to be numeric stays a key. Tokens below the
/// part of the document that exists are kept as keys.
pub fn pointer_to_path(document: &Value, pointer: &str) -> Path {
    let mut path = Path::root();
    let mut current = Some(document);
    for raw in pointer.split('/').skip(1) {
        let token = unescape_token(raw);
        let seg = match (current, token.parse::<usize>()) {
            (Some(Value::Array(_)), Ok(index)) => Seg::Index(index),
            _ => Seg::Key(token),
        };
        current = current.and_then(|value| match (&seg, value) {
            (Seg::Index(i), Value::Array(items)) => items.get(*i),
            (Seg::Key(k), Value::Object(map)) => map.get(k),
            _ => None,
        });
        path.push(seg);
    }
    path
}

fn unescape_token(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}

/// Turn raw violations into the errors a snapshot stores.
///
/// A `required` violation is reported by validators at the object that lacks
/// the property; it is moved to the property itself so the control for that
/// field picks it up.
pub fn normalize(raw: Vec<RawValidationError>) -> Vec<FieldError> {
    raw.into_iter()
        .map(|error| {
            let mut path = error.instance_path;
            if error.keyword == "required" {
                if let Some(name) = error.params.get("missingProperty").and_then(Value::as_str) {
                    path.push_key(name);
                }
            }
            FieldError {
                path,
                keyword: error.keyword,
                message: error.message,
                params: error.params,
            }
        })
        .collect()
}

fn rooted(root: &Path, mut error: FieldError) -> FieldError {
    error.path = root.iter().chain(error.path.iter()).cloned().collect();
    error
}

/// Result of one validation pass.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ValidationOutcome {
    Valid,
    Invalid { errors: Vec<FieldError> },
}

impl ValidationOutcome {
    #[inline]
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid)
    }

    pub fn errors(&self) -> &[FieldError] {
        match self {
            ValidationOutcome::Valid => &[],
            ValidationOutcome::Invalid { errors } => errors,
        }
    }
}

/// Runs validation on blur and records the result in the store.
#[derive(Clone)]
pub struct ValidationCoordinator {
    validator: Arc<dyn SchemaValidator>,
}

impl ValidationCoordinator {
    pub fn new(validator: Arc<dyn SchemaValidator>) -> Self {
        Self { validator }
    }

    /// Validate `document` without touching any store.
    pub fn check(&self, document: &Value) -> ValidationOutcome {
        let errors = normalize(self.validator.validate(document));
        if errors.is_empty() {
            ValidationOutcome::Valid
        } else {
            ValidationOutcome::Invalid { errors }
        }
    }

    /// Validate the value at `root` in the store's current document and
    /// commit the outcome.
    ///
    /// The schema describes the subtree at `root`, so error locations are
    /// resolved against that subtree and then prefixed with `root`; stored
    /// errors always carry absolute document paths. An invalid document
    /// replaces the stored list in one transition. A valid document clears
    /// it, and costs no transition when the store is already clean.
    pub fn validate(&self, store: &FormStore, root: &Path) -> FormResult<ValidationOutcome> {
        let current = store.snapshot();
        let outcome = match self.check(current.value_at(root)) {
            ValidationOutcome::Invalid { errors } if !root.is_empty() => ValidationOutcome::Invalid {
                errors: errors.into_iter().map(|e| rooted(root, e)).collect(),
            },
            outcome => outcome,
        };
        match &outcome {
            ValidationOutcome::Valid if current.is_valid() => {
                debug!("document valid, nothing to clear");
            }
            ValidationOutcome::Valid => {
                store.transition(|draft, _| {
                    draft.set_validation(Vec::new());
                    Ok(())
                })?;
                debug!("document valid, cleared stale errors");
            }
            ValidationOutcome::Invalid { errors } => {
                let errors = errors.clone();
                let count = errors.len();
                store.transition(move |draft, _| {
                    draft.set_validation(errors);
                    Ok(())
                })?;
                debug!(errors = count, "document invalid");
            }
        }
        Ok(outcome)
    }
}

impl fmt::Debug for ValidationCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationCoordinator").finish_non_exhaustive()
    }
}
