//! FormStore holds the current snapshot of a form and commits transitions.
//!
//! Every change goes through [`FormStore::transition`]: the mutator edits a
//! draft copy of the current snapshot, the draft is frozen into a new
//! snapshot, the new snapshot replaces the current one, and the change
//! listener is told about the new document.

use crate::edit::SelfHealing;
use crate::snapshot::{Draft, Snapshot};
use crate::{FieldError, Op, Patch, Path, StateError, StateResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, warn};

/// Callback invoked with the new document after a committed transition.
pub type ChangeListener = Arc<dyn Fn(&Value) + Send + Sync>;

/// Store behaviour knobs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreOptions {
    /// Hold change notifications back; the owner reads the value on submit.
    pub buffer_changes: bool,
    /// How far `Set` edits materialize missing containers.
    pub self_healing: SelfHealing,
}

/// Builder for [`FormStore`].
#[derive(Default)]
pub struct FormStoreBuilder {
    initial: Option<Value>,
    options: StoreOptions,
    listener: Option<ChangeListener>,
}

impl FormStoreBuilder {
    /// Seed document. Defaults to `{}`.
    #[must_use]
    pub fn initial(mut self, value: Value) -> Self {
        self.initial = Some(value);
        self
    }

    #[must_use]
    pub fn options(mut self, options: StoreOptions) -> Self {
        self.options = options;
        self
    }

    /// Listener called after every committed transition.
    #[must_use]
    pub fn on_change(mut self, listener: impl Fn(&Value) + Send + Sync + 'static) -> Self {
        self.listener = Some(Arc::new(listener));
        self
    }

    pub fn build(self) -> FormStore {
        let initial = self
            .initial
            .unwrap_or_else(|| Value::Object(Map::new()));
        FormStore {
            inner: Arc::new(StoreInner {
                current: RwLock::new(Arc::new(Snapshot::new(initial))),
                writing: AtomicBool::new(false),
                options: self.options,
                listener: self.listener,
            }),
        }
    }
}

struct StoreInner {
    current: RwLock<Arc<Snapshot>>,
    writing: AtomicBool,
    options: StoreOptions,
    listener: Option<ChangeListener>,
}

/// The single owner of a form's current snapshot.
///
/// `FormStore` is a cheap handle: clones share the same snapshot, which is how
/// nested controls reach the store without threading it through every layer.
/// Separate stores never share state.
///
/// # Example
///
/// ```
/// use schemaform_state::{FormStore, path};
/// use serde_json::json;
///
/// let store = FormStore::new(json!({"rows": ["A", "B", "C"]}));
/// let before = store.snapshot();
///
/// store.move_array_item(&path!("rows"), 0, 2).unwrap();
///
/// assert_eq!(store.value()["rows"], json!(["B", "C", "A"]));
/// assert_eq!(before.value()["rows"], json!(["A", "B", "C"]));
/// ```
#[derive(Clone)]
pub struct FormStore {
    inner: Arc<StoreInner>,
}

impl FormStore {
    /// Create a store with default options and no listener.
    pub fn new(initial: Value) -> Self {
        Self::builder().initial(initial).build()
    }

    pub fn builder() -> FormStoreBuilder {
        FormStoreBuilder::default()
    }

    #[inline]
    pub fn options(&self) -> &StoreOptions {
        &self.inner.options
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        let current = self
            .inner
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&current)
    }

    /// Clone of the current document.
    pub fn value(&self) -> Value {
        self.snapshot().value().clone()
    }

    /// Clone of the value at `path` in the current document.
    pub fn get(&self, path: &Path) -> Option<Value> {
        self.snapshot().get(path).cloned()
    }

    /// Clone of the current validation result.
    pub fn validation_result(&self) -> Vec<FieldError> {
        self.snapshot().validation().to_vec()
    }

    /// Derive and commit a new snapshot.
    ///
    /// `mutator` receives a draft copy of the current snapshot and, read-only,
    /// the current snapshot itself. If it returns an error nothing is
    /// committed and no listener runs.
    ///
    /// # Errors
    ///
    /// - whatever the mutator returns;
    /// - [`StateError::NestedTransition`] when called while another
    ///   transition on this store is still running its mutator.
    pub fn transition<F>(&self, mutator: F) -> StateResult<Arc<Snapshot>>
    where
        F: FnOnce(&mut Draft, &Snapshot) -> StateResult<()>,
    {
        let guard = WriterGuard::acquire(&self.inner.writing).ok_or_else(|| {
            warn!("transition attempted while another transition is running");
            StateError::NestedTransition
        })?;

        let previous = self.snapshot();
        let mut draft = Draft::from_snapshot(&previous, self.inner.options.self_healing);
        if let Err(err) = mutator(&mut draft, &previous) {
            debug!(error = %err, "transition rejected");
            return Err(err);
        }

        let next = Arc::new(draft.finish());
        {
            let mut current = self
                .inner
                .current
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            *current = Arc::clone(&next);
        }
        drop(guard);

        let notified = self.notify(&next);
        debug!(
            notified,
            errors = next.validation().len(),
            "transition committed"
        );
        Ok(next)
    }

    fn notify(&self, snapshot: &Snapshot) -> bool {
        if self.inner.options.buffer_changes {
            return false;
        }
        match &self.inner.listener {
            Some(listener) => {
                listener(snapshot.value());
                true
            }
            None => false,
        }
    }

    /// Set `value` at `path`, healing a missing parent container.
    pub fn set_value_by_path(&self, path: &Path, value: impl Into<Value>) -> StateResult<Arc<Snapshot>> {
        let value = value.into();
        self.transition(|draft, _| draft.set_value(path, value))
    }

    /// Insert into the array at `path`: appended when `after` is `None`,
    /// otherwise placed right after position `after`. `value` defaults to `{}`.
    pub fn add_array_item_by_path(
        &self,
        path: &Path,
        after: Option<usize>,
        value: Option<Value>,
    ) -> StateResult<Arc<Snapshot>> {
        let value = value.unwrap_or_else(|| Value::Object(Map::new()));
        self.transition(|draft, _| draft.add_item(path, after, value))
    }

    /// Remove the element at `index` from the array at `path`.
    pub fn delete_array_item_by_path(&self, path: &Path, index: usize) -> StateResult<Arc<Snapshot>> {
        self.transition(|draft, _| draft.remove_item(path, index))
    }

    /// Move the element at `from` to `to` within the array at `path`.
    pub fn move_array_item(&self, path: &Path, from: usize, to: usize) -> StateResult<Arc<Snapshot>> {
        self.transition(|draft, _| draft.move_item(path, from, to))
    }

    /// Apply one operation as its own transition.
    pub fn apply_op(&self, op: &Op) -> StateResult<Arc<Snapshot>> {
        self.transition(|draft, _| draft.apply(op))
    }

    /// Apply all operations of `patch` in a single transition.
    pub fn apply(&self, patch: &Patch) -> StateResult<Arc<Snapshot>> {
        debug!(ops = patch.len(), "applying patch");
        self.transition(|draft, _| draft.apply_patch(patch))
    }
}

impl fmt::Debug for FormStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormStore")
            .field("snapshot", &self.snapshot())
            .field("options", &self.inner.options)
            .field("listener", &self.inner.listener.is_some())
            .finish()
    }
}

/// Marks the store as mid-transition for as long as it lives.
struct WriterGuard<'a>(&'a AtomicBool);

impl<'a> WriterGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for WriterGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
