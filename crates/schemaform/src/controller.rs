//! The handle nested controls use to reach their form.
//!
//! A [`FormController`] is cloned into every [`FieldHandle`] instead of being
//! looked up from ambient context: a control holds its own path plus this
//! handle and nothing else.

use crate::schema::{new_item_value, schema_at};
use crate::validation::{ValidationCoordinator, ValidationOutcome};
use crate::{FormOptions, FormResult};
use schemaform_state::{FieldError, FormStore, Patch, Path, Seg, Snapshot, StateError, Value};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Hook invoked after every blur-triggered validation pass.
pub type BlurHook = Arc<dyn Fn(&ValidationOutcome) + Send + Sync>;

/// Shared access to a form's store, schema and validation.
///
/// Cloning is cheap; every clone drives the same form. Paths given to the
/// controller are absolute document paths (they already include
/// [`FormOptions::data_path`]).
#[derive(Clone)]
pub struct FormController {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    store: FormStore,
    schema: Arc<Value>,
    coordinator: ValidationCoordinator,
    options: FormOptions,
    on_blur: Option<BlurHook>,
}

impl FormController {
    pub(crate) fn new(
        store: FormStore,
        schema: Arc<Value>,
        coordinator: ValidationCoordinator,
        options: FormOptions,
        on_blur: Option<BlurHook>,
    ) -> Self {
        Self {
            inner: Arc::new(ControllerInner {
                store,
                schema,
                coordinator,
                options,
                on_blur,
            }),
        }
    }

    #[inline]
    pub fn store(&self) -> &FormStore {
        &self.inner.store
    }

    #[inline]
    pub fn schema(&self) -> &Value {
        &self.inner.schema
    }

    #[inline]
    pub fn options(&self) -> &FormOptions {
        &self.inner.options
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.inner.store.snapshot()
    }

    /// Handle for the field at `path`.
    pub fn field(&self, path: Path) -> FieldHandle {
        FieldHandle {
            path,
            controller: self.clone(),
        }
    }

    /// Handle for the root the form renders, i.e. `data_path`.
    pub fn root(&self) -> FieldHandle {
        self.field(self.inner.options.data_path.clone())
    }

    /// Schema describing the value at the absolute `path`, if the schema
    /// reaches that far.
    pub fn schema_for(&self, path: &Path) -> Option<&Value> {
        let data_path = &self.inner.options.data_path;
        if !path.starts_with(data_path) {
            return None;
        }
        let relative: Path = path.iter().skip(data_path.len()).cloned().collect();
        schema_at(&self.inner.schema, &relative)
    }

    /// Current value at `path`; missing reads as `null`.
    pub fn value_at(&self, path: &Path) -> Value {
        self.snapshot().value_at(path).clone()
    }

    /// Errors from the last validation pass located at or below `path`.
    pub fn errors_at(&self, path: &Path) -> Vec<FieldError> {
        self.snapshot()
            .errors_for(path)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn set_value(&self, path: &Path, value: impl Into<Value>) -> FormResult<Arc<Snapshot>> {
        Ok(self.inner.store.set_value_by_path(path, value)?)
    }

    /// Insert into the array at `path`. Without an explicit `value` the item
    /// schema's `default` is used, falling back to `{}`.
    pub fn add_item(
        &self,
        path: &Path,
        after: Option<usize>,
        value: Option<Value>,
    ) -> FormResult<Arc<Snapshot>> {
        let value = value.unwrap_or_else(|| {
            let next = self
                .snapshot()
                .get(path)
                .and_then(Value::as_array)
                .map_or(0, Vec::len);
            new_item_value(self.schema_for(&path.with_segment(next)))
        });
        Ok(self
            .inner
            .store
            .add_array_item_by_path(path, after, Some(value))?)
    }

    pub fn remove_item(&self, path: &Path, index: usize) -> FormResult<Arc<Snapshot>> {
        Ok(self.inner.store.delete_array_item_by_path(path, index)?)
    }

    pub fn move_item(&self, path: &Path, from: usize, to: usize) -> FormResult<Arc<Snapshot>> {
        Ok(self.inner.store.move_array_item(path, from, to)?)
    }

    /// Apply a batch of edits as one transition.
    pub fn apply(&self, patch: &Patch) -> FormResult<Arc<Snapshot>> {
        Ok(self.inner.store.apply(patch)?)
    }

    /// A control lost focus: validate the form's value at `data_path`,
    /// record the result, then run the blur hook.
    pub fn blur(&self) -> FormResult<ValidationOutcome> {
        let outcome = self
            .inner
            .coordinator
            .validate(&self.inner.store, &self.inner.options.data_path)?;
        if let Some(hook) = &self.inner.on_blur {
            hook(&outcome);
        }
        Ok(outcome)
    }

    /// The current document, as handed to the owner on submit.
    pub fn submit(&self) -> Value {
        let value = self.inner.store.value();
        debug!(buffered = self.inner.options.enable_submit_buffering, "form submitted");
        value
    }
}

impl fmt::Debug for FormController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormController")
            .field("store", &self.inner.store)
            .field("options", &self.inner.options)
            .field("on_blur", &self.inner.on_blur.is_some())
            .finish()
    }
}

/// A control's view of the form: its path plus the shared controller.
#[derive(Clone, Debug)]
pub struct FieldHandle {
    path: Path,
    controller: FormController,
}

impl FieldHandle {
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    pub fn controller(&self) -> &FormController {
        &self.controller
    }

    /// Handle for a direct child of this field.
    pub fn child(&self, seg: impl Into<Seg>) -> FieldHandle {
        self.controller.field(self.path.with_segment(seg))
    }

    pub fn schema(&self) -> Option<&Value> {
        self.controller.schema_for(&self.path)
    }

    pub fn value(&self) -> Value {
        self.controller.value_at(&self.path)
    }

    pub fn errors(&self) -> Vec<FieldError> {
        self.controller.errors_at(&self.path)
    }

    pub fn has_errors(&self) -> bool {
        self.controller
            .snapshot()
            .validation()
            .iter()
            .any(|e| e.applies_to(&self.path))
    }

    pub fn set(&self, value: impl Into<Value>) -> FormResult<Arc<Snapshot>> {
        self.controller.set_value(&self.path, value)
    }

    /// Add an element to the array this field holds.
    pub fn add_item(&self, after: Option<usize>) -> FormResult<Arc<Snapshot>> {
        self.controller.add_item(&self.path, after, None)
    }

    pub fn add_item_with(&self, after: Option<usize>, value: Value) -> FormResult<Arc<Snapshot>> {
        self.controller.add_item(&self.path, after, Some(value))
    }

    pub fn remove_item(&self, index: usize) -> FormResult<Arc<Snapshot>> {
        self.controller.remove_item(&self.path, index)
    }

    pub fn move_item(&self, from: usize, to: usize) -> FormResult<Arc<Snapshot>> {
        self.controller.move_item(&self.path, from, to)
    }

    /// Array holding this field and the field's position in it.
    ///
    /// # Errors
    ///
    /// [`StateError::InvalidOperation`] when the field is not an array element.
    pub fn item_position(&self) -> FormResult<(Path, usize)> {
        match self.path.last() {
            Some(Seg::Index(index)) => Ok((self.path.parent_path(), *index)),
            _ => Err(StateError::invalid_operation(format!(
                "`{}` is not an array element",
                self.path
            ))
            .into()),
        }
    }

    /// Remove this element from its array.
    pub fn remove_self(&self) -> FormResult<Arc<Snapshot>> {
        let (array, index) = self.item_position()?;
        self.controller.remove_item(&array, index)
    }

    /// Swap this element with the one before it.
    pub fn move_up(&self) -> FormResult<Arc<Snapshot>> {
        let (array, index) = self.item_position()?;
        if index == 0 {
            return Err(StateError::invalid_operation(format!("`{}` is already first", self.path)).into());
        }
        self.controller.move_item(&array, index, index - 1)
    }

    /// Swap this element with the one after it.
    pub fn move_down(&self) -> FormResult<Arc<Snapshot>> {
        let (array, index) = self.item_position()?;
        let len = self
            .controller
            .snapshot()
            .get(&array)
            .and_then(Value::as_array)
            .map_or(0, Vec::len);
        if index + 1 >= len {
            return Err(StateError::invalid_operation(format!("`{}` is already last", self.path)).into());
        }
        self.controller.move_item(&array, index, index + 1)
    }

    pub fn blur(&self) -> FormResult<ValidationOutcome> {
        self.controller.blur()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{JsonSchemaValidator, SchemaValidator};
    use crate::FormError;
    use schemaform_state::path;
    use serde_json::json;

    fn controller(schema: Value, value: Value, options: FormOptions) -> FormController {
        let validator: Arc<dyn SchemaValidator> = Arc::new(JsonSchemaValidator::new(&schema).unwrap());
        let store = FormStore::builder()
            .initial(value)
            .options(options.store_options())
            .build();
        FormController::new(
            store,
            Arc::new(schema),
            ValidationCoordinator::new(validator),
            options,
            None,
        )
    }

    fn rows_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "rows": {
                    "type": "array",
                    "items": {"type": "string", "default": ""}
                }
            }
        })
    }

    #[test]
    fn test_handles_share_one_store() {
        let ctl = controller(rows_schema(), json!({"rows": ["A"]}), FormOptions::default());
        let rows = ctl.root().child("rows");
        let first = rows.child(0usize);

        first.set("changed").unwrap();
        assert_eq!(rows.value(), json!(["changed"]));
        assert_eq!(ctl.store().value(), json!({"rows": ["changed"]}));
    }

    #[test]
    fn test_add_item_uses_item_default() {
        let ctl = controller(rows_schema(), json!({"rows": []}), FormOptions::default());
        let rows = ctl.root().child("rows");
        rows.add_item(None).unwrap();
        rows.add_item_with(Some(0), json!("x")).unwrap();
        assert_eq!(rows.value(), json!(["", "x"]));
    }

    #[test]
    fn test_item_moves_and_removal() {
        let ctl = controller(rows_schema(), json!({"rows": ["A", "B", "C"]}), FormOptions::default());
        let rows = ctl.root().child("rows");

        rows.child(0usize).move_down().unwrap();
        assert_eq!(rows.value(), json!(["B", "A", "C"]));
        rows.child(2usize).move_up().unwrap();
        assert_eq!(rows.value(), json!(["B", "C", "A"]));
        rows.child(1usize).remove_self().unwrap();
        assert_eq!(rows.value(), json!(["B", "A"]));
    }

    #[test]
    fn test_item_actions_at_the_edges_are_rejected() {
        let ctl = controller(rows_schema(), json!({"rows": ["A", "B"]}), FormOptions::default());
        let rows = ctl.root().child("rows");

        let err = rows.child(0usize).move_up().unwrap_err();
        assert!(matches!(err, FormError::State(StateError::InvalidOperation { .. })));
        assert!(rows.child(1usize).move_down().is_err());
        assert!(rows.remove_self().is_err());
        assert_eq!(rows.value(), json!(["A", "B"]));
    }

    #[test]
    fn test_data_path_prefix() {
        let options = FormOptions {
            data_path: path!("payload"),
            ..FormOptions::default()
        };
        let ctl = controller(rows_schema(), json!({"payload": {"rows": []}}), options);
        let root = ctl.root();
        assert_eq!(root.path(), &path!("payload"));
        assert_eq!(root.schema(), Some(&rows_schema()));
        assert_eq!(
            ctl.schema_for(&path!("payload", "rows", 0)),
            Some(&json!({"type": "string", "default": ""}))
        );
        assert_eq!(ctl.schema_for(&path!("rows")), None);

        root.child("rows").add_item(None).unwrap();
        assert_eq!(ctl.store().value(), json!({"payload": {"rows": [""]}}));
    }

    #[test]
    fn test_blur_runs_hook_after_validation() {
        let schema = json!({"type": "object", "required": ["name"]});
        let validator: Arc<dyn SchemaValidator> = Arc::new(JsonSchemaValidator::new(&schema).unwrap());
        let store = FormStore::new(json!({}));
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let probe = store.clone();
        let hook: BlurHook = Arc::new(move |outcome: &ValidationOutcome| {
            // the store already holds the errors when the hook runs
            sink.lock()
                .unwrap()
                .push((outcome.is_valid(), probe.validation_result().len()));
        });
        let ctl = FormController::new(
            store,
            Arc::new(schema),
            ValidationCoordinator::new(validator),
            FormOptions::default(),
            Some(hook),
        );

        ctl.root().blur().unwrap();
        ctl.set_value(&path!("name"), "x").unwrap();
        ctl.root().blur().unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![(false, 1), (true, 0)]);
    }

    #[test]
    fn test_errors_at_and_has_errors() {
        let schema = json!({
            "type": "object",
            "properties": {"user": {"type": "object", "required": ["name"]}}
        });
        let ctl = controller(schema, json!({"user": {}}), FormOptions::default());
        ctl.blur().unwrap();

        let user = ctl.root().child("user");
        assert!(user.has_errors());
        assert!(user.child("name").has_errors());
        assert_eq!(user.child("name").errors()[0].keyword, "required");
        assert!(!user.child("email").has_errors());
        assert_eq!(ctl.errors_at(&Path::root()).len(), 1);
    }
}
