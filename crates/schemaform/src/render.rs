//! Headless render tree.
//!
//! Rendering turns the schema plus one snapshot into a tree of [`FieldNode`]s.
//! Which strategy renders a node depends only on the schema kind at that
//! node: [`ObjectForm`] walks `properties`, [`ArrayForm`] walks the elements
//! present in the document, and [`LeafField`] covers everything else. A widget
//! layer maps nodes onto real controls and drives edits through each node's
//! [`FieldHandle`].

use crate::controller::{FieldHandle, FormController};
use crate::schema::{self, SchemaKind};
use crate::{Locale, UiText};
use schemaform_state::{FieldError, Path, Snapshot, Value};
use serde::Serialize;

/// A chrome action a control offers, with its localized label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct FieldAction {
    pub action: UiText,
    pub label: &'static str,
}

impl FieldAction {
    fn new(action: UiText, locale: Locale) -> Self {
        Self {
            action,
            label: locale.text(action),
        }
    }
}

/// One rendered control.
#[derive(Clone, Debug, Serialize)]
pub struct FieldNode {
    pub path: Path,
    pub kind: SchemaKind,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub required: bool,
    pub value: Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<FieldAction>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FieldNode>,
    #[serde(skip)]
    pub handle: FieldHandle,
}

impl FieldNode {
    /// Depth-first search for the node rendered at `path`.
    pub fn find(&self, path: &Path) -> Option<&FieldNode> {
        if &self.path == path {
            return Some(self);
        }
        if !path.starts_with(&self.path) {
            return None;
        }
        self.children.iter().find_map(|child| child.find(path))
    }

    /// All nodes in the subtree, parents before children.
    pub fn walk(&self) -> Vec<&FieldNode> {
        let mut out = vec![self];
        for child in &self.children {
            out.extend(child.walk());
        }
        out
    }

    #[inline]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// What a strategy needs to know about the node it renders.
#[derive(Clone, Debug)]
pub struct FieldSpec<'s> {
    pub schema: &'s Value,
    pub path: Path,
    pub label: String,
    pub required: bool,
    /// Actions contributed by the parent, e.g. reordering inside an array.
    pub actions: Vec<FieldAction>,
}

/// Everything rendering reads from: one snapshot and the shared controller.
pub struct RenderContext<'a> {
    pub snapshot: &'a Snapshot,
    pub controller: &'a FormController,
    pub locale: Locale,
}

impl RenderContext<'_> {
    fn node(
        &self,
        spec: FieldSpec<'_>,
        kind: SchemaKind,
        children: Vec<FieldNode>,
        own_actions: Vec<FieldAction>,
    ) -> FieldNode {
        let mut actions = spec.actions;
        actions.extend(own_actions);
        FieldNode {
            kind,
            label: spec.label,
            description: schema::description(spec.schema).map(str::to_owned),
            required: spec.required,
            value: self.snapshot.value_at(&spec.path).clone(),
            errors: self
                .snapshot
                .errors_for(&spec.path)
                .into_iter()
                .cloned()
                .collect(),
            actions,
            children,
            handle: self.controller.field(spec.path.clone()),
            path: spec.path,
        }
    }
}

/// Renders one schema kind.
pub trait RenderStrategy {
    fn render(&self, cx: &RenderContext<'_>, spec: FieldSpec<'_>) -> FieldNode;
}

/// Strategy that renders nodes of `kind`.
pub fn strategy_for(kind: SchemaKind) -> &'static dyn RenderStrategy {
    match kind {
        SchemaKind::Object => &ObjectForm,
        SchemaKind::Array => &ArrayForm,
        _ => &LeafField,
    }
}

/// Render the subtree described by `spec`, dispatching on its schema kind.
pub fn render_field(cx: &RenderContext<'_>, spec: FieldSpec<'_>) -> FieldNode {
    strategy_for(SchemaKind::of(spec.schema)).render(cx, spec)
}

/// One child per declared property, in declaration order.
#[derive(Clone, Copy, Debug, Default)]
pub struct ObjectForm;

impl RenderStrategy for ObjectForm {
    fn render(&self, cx: &RenderContext<'_>, spec: FieldSpec<'_>) -> FieldNode {
        let children = schema::properties(spec.schema)
            .into_iter()
            .flatten()
            .map(|(name, prop)| {
                render_field(
                    cx,
                    FieldSpec {
                        schema: prop,
                        path: spec.path.with_segment(name.as_str()),
                        label: schema::title(prop).unwrap_or(name).to_owned(),
                        required: schema::is_required(spec.schema, name),
                        actions: Vec::new(),
                    },
                )
            })
            .collect();
        cx.node(spec, SchemaKind::Object, children, Vec::new())
    }
}

/// One child per element currently in the array, plus add/remove/reorder
/// actions.
#[derive(Clone, Copy, Debug, Default)]
pub struct ArrayForm;

static ANY_SCHEMA: Value = Value::Null;

impl RenderStrategy for ArrayForm {
    fn render(&self, cx: &RenderContext<'_>, spec: FieldSpec<'_>) -> FieldNode {
        let len = cx
            .snapshot
            .get(&spec.path)
            .and_then(Value::as_array)
            .map_or(0, Vec::len);
        let children = (0..len)
            .map(|index| {
                let item = schema::item_schema(spec.schema, index).unwrap_or(&ANY_SCHEMA);
                let mut actions = vec![FieldAction::new(UiText::RemoveItem, cx.locale)];
                if index > 0 {
                    actions.push(FieldAction::new(UiText::MoveUp, cx.locale));
                }
                if index + 1 < len {
                    actions.push(FieldAction::new(UiText::MoveDown, cx.locale));
                }
                let label = match schema::title(item) {
                    Some(title) => format!("{title} {}", index + 1),
                    None => format!("#{}", index + 1),
                };
                render_field(
                    cx,
                    FieldSpec {
                        schema: item,
                        path: spec.path.with_segment(index),
                        label,
                        required: false,
                        actions,
                    },
                )
            })
            .collect();
        let add = vec![FieldAction::new(UiText::AddItem, cx.locale)];
        cx.node(spec, SchemaKind::Array, children, add)
    }
}

/// A single input bound to one value.
#[derive(Clone, Copy, Debug, Default)]
pub struct LeafField;

impl RenderStrategy for LeafField {
    fn render(&self, cx: &RenderContext<'_>, spec: FieldSpec<'_>) -> FieldNode {
        let kind = SchemaKind::of(spec.schema);
        cx.node(spec, kind, Vec::new(), Vec::new())
    }
}
