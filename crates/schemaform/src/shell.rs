//! FormShell: owns a form's store and wires schema, validation and hooks.

use crate::controller::{BlurHook, FieldHandle, FormController};
use crate::render::{render_field, FieldNode, FieldSpec, RenderContext};
use crate::schema::{self, SchemaKind};
use crate::validation::{JsonSchemaValidator, SchemaValidator, ValidationCoordinator, ValidationOutcome};
use crate::{FormError, FormOptions, FormResult, UiText};
use schemaform_state::{ChangeListener, FieldError, FormStore, Value};
use serde_json::Map;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Builder for [`FormShell`].
#[derive(Default)]
pub struct FormShellBuilder {
    schema: Option<Value>,
    value: Option<Value>,
    options: FormOptions,
    on_change: Option<ChangeListener>,
    on_blur: Option<BlurHook>,
    validator: Option<Arc<dyn SchemaValidator>>,
}

impl FormShellBuilder {
    #[must_use]
    pub fn schema(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Initial document. Defaults to `{}`.
    #[must_use]
    pub fn value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    #[must_use]
    pub fn options(mut self, options: FormOptions) -> Self {
        self.options = options;
        self
    }

    /// Called with the new document after every committed edit, unless
    /// submit buffering is on.
    #[must_use]
    pub fn on_change(mut self, hook: impl Fn(&Value) + Send + Sync + 'static) -> Self {
        self.on_change = Some(Arc::new(hook));
        self
    }

    /// Called after each blur-triggered validation pass.
    #[must_use]
    pub fn on_blur(mut self, hook: impl Fn(&ValidationOutcome) + Send + Sync + 'static) -> Self {
        self.on_blur = Some(Arc::new(hook));
        self
    }

    /// Replace the `jsonschema` validator compiled from the schema.
    #[must_use]
    pub fn validator(mut self, validator: Arc<dyn SchemaValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Check the schema, compile the validator and create the store.
    ///
    /// # Errors
    ///
    /// - [`FormError::UnsupportedType`] when the root schema is neither an
    ///   object nor an array;
    /// - [`FormError::InvalidSchema`] when there is no schema or it does not
    ///   compile.
    pub fn build(self) -> FormResult<FormShell> {
        let schema = self
            .schema
            .ok_or_else(|| FormError::invalid_schema("no schema given"))?;
        let kind = schema::root_kind(&schema)?;
        let validator = match self.validator {
            Some(validator) => validator,
            None => Arc::new(JsonSchemaValidator::new(&schema)?),
        };

        let mut store = FormStore::builder()
            .initial(self.value.unwrap_or_else(|| Value::Object(Map::new())))
            .options(self.options.store_options());
        if let Some(hook) = self.on_change {
            store = store.on_change(move |value| hook(value));
        }

        debug!(
            kind = kind.as_str(),
            locale = %self.options.locale,
            buffered = self.options.enable_submit_buffering,
            "form created"
        );
        let controller = FormController::new(
            store.build(),
            Arc::new(schema),
            ValidationCoordinator::new(validator),
            self.options,
            self.on_blur,
        );
        Ok(FormShell { kind, controller })
    }
}

/// A live form: one store, one schema, one validator.
///
/// # Example
///
/// ```
/// use schemaform::FormShell;
/// use schemaform_state::path;
/// use serde_json::json;
///
/// let form = FormShell::builder()
///     .schema(json!({
///         "type": "object",
///         "properties": {
///             "user": {"type": "object", "required": ["name"]}
///         }
///     }))
///     .value(json!({"user": {}}))
///     .build()
///     .unwrap();
///
/// let outcome = form.blur().unwrap();
/// assert!(!outcome.is_valid());
/// assert_eq!(form.errors()[0].path, path!("user", "name"));
///
/// form.root().child("user").child("name").set("Alice").unwrap();
/// assert!(form.blur().unwrap().is_valid());
/// ```
pub struct FormShell {
    kind: SchemaKind,
    controller: FormController,
}

impl FormShell {
    pub fn builder() -> FormShellBuilder {
        FormShellBuilder::default()
    }

    /// Form over `schema` with default options and an empty document.
    pub fn new(schema: Value) -> FormResult<Self> {
        Self::builder().schema(schema).build()
    }

    /// Kind of the root schema: always `Object` or `Array`.
    #[inline]
    pub fn kind(&self) -> SchemaKind {
        self.kind
    }

    #[inline]
    pub fn controller(&self) -> &FormController {
        &self.controller
    }

    #[inline]
    pub fn store(&self) -> &FormStore {
        self.controller.store()
    }

    #[inline]
    pub fn options(&self) -> &FormOptions {
        self.controller.options()
    }

    /// Handle for the field the root schema renders.
    pub fn root(&self) -> FieldHandle {
        self.controller.root()
    }

    pub fn value(&self) -> Value {
        self.store().value()
    }

    /// Errors recorded by the last blur.
    pub fn errors(&self) -> Vec<FieldError> {
        self.store().validation_result()
    }

    /// Build the render tree from the current snapshot.
    pub fn render(&self) -> FieldNode {
        let snapshot = self.controller.snapshot();
        let cx = RenderContext {
            snapshot: &snapshot,
            controller: &self.controller,
            locale: self.options().locale,
        };
        let schema = self.controller.schema();
        let label = schema::title(schema).unwrap_or_default().to_owned();
        render_field(
            &cx,
            FieldSpec {
                schema,
                path: self.options().data_path.clone(),
                label,
                required: false,
                actions: Vec::new(),
            },
        )
    }

    pub fn blur(&self) -> FormResult<ValidationOutcome> {
        self.controller.blur()
    }

    /// The current document, for owners that buffer changes until submit.
    pub fn submit(&self) -> Value {
        self.controller.submit()
    }

    /// Label of the submit button, shown only while changes are buffered.
    pub fn submit_label(&self) -> Option<&'static str> {
        let options = self.options();
        options
            .enable_submit_buffering
            .then(|| options.locale.text(UiText::Submit))
    }
}

impl fmt::Debug for FormShell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormShell")
            .field("kind", &self.kind)
            .field("controller", &self.controller)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Locale;
    use schemaform_state::{path, StateError};
    use serde_json::json;
    use std::sync::Mutex;

    #[test]
    fn test_root_type_selects_strategy() {
        assert_eq!(
            FormShell::new(json!({"type": "object"})).unwrap().kind(),
            SchemaKind::Object
        );
        assert_eq!(
            FormShell::new(json!({"type": "array"})).unwrap().kind(),
            SchemaKind::Array
        );
        let err = FormShell::new(json!({"type": "number"})).unwrap_err();
        assert!(matches!(err, FormError::UnsupportedType { .. }));
    }

    #[test]
    fn test_missing_schema_is_invalid() {
        let err = FormShell::builder().build().unwrap_err();
        assert!(matches!(err, FormError::InvalidSchema(_)));
    }

    #[test]
    fn test_default_value_is_empty_object() {
        let form = FormShell::new(json!({"type": "object"})).unwrap();
        assert_eq!(form.value(), json!({}));
        assert!(form.errors().is_empty());
    }

    #[test]
    fn test_on_change_receives_each_edit() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let form = FormShell::builder()
            .schema(json!({"type": "object"}))
            .on_change(move |v| sink.lock().unwrap().push(v.clone()))
            .build()
            .unwrap();

        form.root().child("a").set(1).unwrap();
        form.root().child("b").set(2).unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(*seen, vec![json!({"a": 1}), json!({"a": 1, "b": 2})]);
    }

    #[test]
    fn test_submit_buffering() {
        let calls = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&calls);
        let form = FormShell::builder()
            .schema(json!({"type": "object"}))
            .options(FormOptions {
                enable_submit_buffering: true,
                locale: Locale::ZhCn,
                ..FormOptions::default()
            })
            .on_change(move |_| *counter.lock().unwrap() += 1)
            .build()
            .unwrap();

        form.root().child("a").set("x").unwrap();
        assert_eq!(*calls.lock().unwrap(), 0);
        assert_eq!(form.submit(), json!({"a": "x"}));
        assert_eq!(form.submit_label(), Some("提交"));

        let unbuffered = FormShell::new(json!({"type": "object"})).unwrap();
        assert_eq!(unbuffered.submit_label(), None);
    }

    #[test]
    fn test_rejected_edit_surfaces_state_error() {
        let form = FormShell::builder()
            .schema(json!({"type": "object"}))
            .value(json!({"name": "x"}))
            .build()
            .unwrap();
        let err = form.root().child("name").add_item(None).unwrap_err();
        assert!(matches!(
            err,
            FormError::State(StateError::TypeMismatch { expected: "array", .. })
        ));
    }

    #[test]
    fn test_render_uses_data_path() {
        let form = FormShell::builder()
            .schema(json!({
                "type": "object",
                "title": "Profile",
                "properties": {"name": {"type": "string"}}
            }))
            .value(json!({"profile": {"name": "Alice"}}))
            .options(FormOptions {
                data_path: path!("profile"),
                ..FormOptions::default()
            })
            .build()
            .unwrap();

        let tree = form.render();
        assert_eq!(tree.path, path!("profile"));
        assert_eq!(tree.label, "Profile");
        assert_eq!(tree.children[0].path, path!("profile", "name"));
        assert_eq!(tree.children[0].value, json!("Alice"));
    }
}
