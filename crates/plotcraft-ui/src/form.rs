//! Metadata-driven form builder
//!
//! [`FormBuilder`] walks a metadata subtree and renders one field control
//! per visible leaf and one [`GroupElement`] per included group. Visibility
//! is decided by the allow-list, by the group's master selector and by
//! the active sub-type filter, which is threaded through the walk in a
//! [`FilterContext`].
//!
//! Every rendered field gets a [`Binding`] in the [`BindingRegistry`]
//! recording how a commit on it must be applied. Re-rendering part of the
//! surface releases the bindings of the controls it discards, so a commit
//! can never reach a control that is no longer shown.

use std::collections::HashMap;

use serde_json::Value;

use plotcraft_meta::{AllowList, Dictionary, GroupNode, LeafNode, MetadataNode, OptionsState};

use crate::field::{FieldHandle, FieldOptions, FieldRenderer, FieldRequest};
use crate::surface::{Element, GroupElement, MasterSelector, SlotId, NO_DATA_MESSAGE};

/// Transient filter state threaded through one render pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterContext {
    /// Array element edited by the leaves being rendered
    pub detail_index: Option<usize>,
    /// Option path of the active filter's master field
    pub filtered_by: Option<String>,
    /// Current value of the master field
    pub filter_value: Option<String>,
    /// Group that declared the active filter
    pub filter_owner: Option<SlotId>,
}

impl FilterContext {
    /// Context with an active filter
    #[must_use]
    pub fn with_filter(mut self, filtered_by: impl Into<String>, value: Option<String>) -> Self {
        self.filtered_by = Some(filtered_by.into());
        self.filter_value = value;
        self
    }
}

/// Interpret an option value as a filter value. Null and the empty
/// string mean no filter.
#[must_use]
pub fn filter_value_of(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// How a commit on a rendered field is applied
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    /// Field of the simple (category) view
    Simple {
        field_id: String,
        detail_index: Option<usize>,
        filtered_by: Option<String>,
        filter_owner: Option<SlotId>,
    },
    /// Entry of the advanced view
    Advanced {
        field_id: String,
        node_id: String,
        arr_index: Option<usize>,
        discriminator: bool,
    },
}

impl Binding {
    /// Option path the binding edits
    #[must_use]
    pub fn field_id(&self) -> &str {
        match self {
            Self::Simple { field_id, .. } | Self::Advanced { field_id, .. } => field_id,
        }
    }
}

/// Registry of live field bindings
#[derive(Debug, Default)]
pub struct BindingRegistry {
    bindings: HashMap<FieldHandle, Binding>,
    next_id: u64,
}

impl BindingRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
            next_id: 1,
        }
    }

    /// Register a binding and return its handle
    pub fn register(&mut self, binding: Binding) -> FieldHandle {
        let handle = FieldHandle::new(self.next_id.max(1));
        self.next_id = handle.raw() + 1;
        self.bindings.insert(handle, binding);
        handle
    }

    /// Look up a binding
    #[must_use]
    pub fn get(&self, handle: FieldHandle) -> Option<&Binding> {
        self.bindings.get(&handle)
    }

    /// Release the given handles
    pub fn release<I: IntoIterator<Item = FieldHandle>>(&mut self, handles: I) {
        for handle in handles {
            self.bindings.remove(&handle);
        }
    }

    /// Number of live bindings
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether no bindings are live
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Renders metadata nodes into surface elements
pub struct FormBuilder<'a> {
    options: &'a OptionsState,
    allow: &'a AllowList,
    dictionary: &'a Dictionary,
    renderer: &'a dyn FieldRenderer,
    bindings: &'a mut BindingRegistry,
}

impl<'a> FormBuilder<'a> {
    /// Create a builder over the given state
    pub fn new(
        options: &'a OptionsState,
        allow: &'a AllowList,
        dictionary: &'a Dictionary,
        renderer: &'a dyn FieldRenderer,
        bindings: &'a mut BindingRegistry,
    ) -> Self {
        Self {
            options,
            allow,
            dictionary,
            renderer,
            bindings,
        }
    }

    /// Render every top-level node of a category
    pub fn render_all(&mut self, nodes: &[MetadataNode], target: &mut Vec<Element>, ctx: &FilterContext) {
        for (index, node) in nodes.iter().enumerate() {
            self.render(node, SlotId::root(index), target, ctx);
        }
    }

    /// Render one node at `slot` into `target`
    pub fn render(&mut self, node: &MetadataNode, slot: SlotId, target: &mut Vec<Element>, ctx: &FilterContext) {
        match node {
            MetadataNode::Group(group) => self.render_group(node, group, slot, target, ctx),
            MetadataNode::Leaf(leaf) => self.render_leaf(leaf, target, ctx),
        }
    }

    /// Render the children of a group that is already on the surface
    pub fn render_children(&mut self, group: &GroupNode, slot: &SlotId, target: &mut Vec<Element>, ctx: &FilterContext) {
        for (index, child) in group.children.iter().enumerate() {
            self.render(child, slot.child(index), target, ctx);
        }
    }

    fn render_group(
        &mut self,
        node: &MetadataNode,
        group: &GroupNode,
        slot: SlotId,
        target: &mut Vec<Element>,
        ctx: &FilterContext,
    ) {
        if !self.allow.should_include(node) {
            tracing::trace!(%slot, "group has no allowed leaves");
            return;
        }

        let mut ctx = ctx.clone();
        let mut own_filter = None;

        if let Some(path) = &group.filtered_by {
            // An explicit filter for this path (no owner yet) wins over the options
            let explicit = ctx.filter_owner.is_none() && ctx.filter_value.is_some() && ctx.filtered_by.as_ref() == Some(path);
            if !explicit {
                ctx.filter_value = self.options.get(path, ctx.detail_index).and_then(filter_value_of);
                own_filter = Some(path);
            }
            ctx.filtered_by = Some(path.clone());
            ctx.filter_owner = Some(slot.clone());
        }

        let mut master = None;
        if let Some(controlled) = &group.controlled_by {
            let candidates = controlled.candidates(self.options, ctx.detail_index);
            if candidates.is_empty() {
                tracing::debug!(%slot, "master selector has no candidates");
                target.push(Element::Placeholder(NO_DATA_MESSAGE.to_string()));
                return;
            }

            let selected = ctx.detail_index.unwrap_or(0).min(candidates.len() - 1);
            master = Some(MasterSelector {
                labels: candidates.iter().map(|c| controlled.label(c)).collect(),
                selected,
            });
            if ctx.detail_index.unwrap_or(0) != selected {
                // Clamped: filter by the element the children will edit
                if let Some(path) = own_filter {
                    ctx.filter_value = self.options.get(path, Some(selected)).and_then(filter_value_of);
                }
            }
            ctx.detail_index = Some(selected);
        }

        let mut element = GroupElement {
            slot,
            heading: group.text.as_deref().map(|text| self.dictionary.lookup(text)),
            master,
            children: Vec::new(),
            context: ctx,
        };
        let child_ctx = element.context.clone();
        self.render_children(group, &element.slot, &mut element.children, &child_ctx);
        target.push(Element::Group(element));
    }

    fn render_leaf(&mut self, leaf: &LeafNode, target: &mut Vec<Element>, ctx: &FilterContext) {
        let filter = ctx.filter_value.as_deref();
        if !leaf.admits_filter(filter) {
            tracing::trace!(id = %leaf.id, ?filter, "leaf filtered out by sub-type");
            return;
        }
        if !self.allow.admits(&leaf.id) {
            tracing::trace!(id = %leaf.id, "leaf not in allow-list");
            return;
        }

        let detail_index = leaf.data_index.or(ctx.detail_index);
        let value = leaf.resolve_value(self.options, detail_index, filter);

        let handle = self.bindings.register(Binding::Simple {
            field_id: leaf.id.clone(),
            detail_index,
            filtered_by: ctx.filtered_by.clone(),
            filter_owner: ctx.filter_owner.clone(),
        });

        let control = self.renderer.render(FieldRequest {
            kind: leaf.kind(),
            value,
            options: FieldOptions {
                title: self.dictionary.option_title(&leaf.pid),
                tooltip: self.dictionary.option_tooltip(&leaf.pid),
                values: leaf.values.clone(),
                custom: leaf.custom.clone(),
                defaults: leaf.defaults.clone(),
                attributes: leaf.attributes.clone(),
            },
            handle,
            field_id: &leaf.id,
        });
        target.push(Element::Field(control));
    }
}

/// Find the node at `slot` within a category's top-level nodes
#[must_use]
pub fn node_at<'a>(nodes: &'a [MetadataNode], slot: &SlotId) -> Option<&'a MetadataNode> {
    let (first, rest) = slot.indices().split_first()?;
    let mut node = nodes.get(*first)?;
    for index in rest {
        node = node.as_group()?.children.get(*index)?;
    }
    Some(node)
}

/// Re-render the children of the group at `slot` with a new context.
///
/// Releases the bindings of the discarded controls before rendering.
/// Returns false if no group is rendered at `slot` or the metadata at
/// `slot` is not a group.
pub fn rerender_group(
    builder: &mut FormBuilder<'_>,
    nodes: &[MetadataNode],
    target: &mut GroupElement,
    ctx: FilterContext,
) -> bool {
    let Some(group) = node_at(nodes, &target.slot).and_then(MetadataNode::as_group) else {
        return false;
    };

    builder.bindings.release(target.handles());
    target.children.clear();
    builder.render_children(group, &target.slot, &mut target.children, &ctx);
    target.context = ctx;
    true
}
