//! Chart customizer widget
//!
//! The customizer pairs a category list with a metadata-driven form (the
//! simple view) and, unless disabled, an option tree with a flat entry
//! list (the advanced view). Every committed edit is written into the
//! widget's [`OptionsState`] and published as a [`PropertyChange`].
//!
//! # Example
//!
//! ```
//! use plotcraft_meta::{Category, GroupNode, LeafNode, MetadataNode, OptionsCatalog};
//! use plotcraft_ui::{ChartCustomizer, CustomizerConfig, CustomizerSources};
//! use serde_json::json;
//!
//! let catalog = OptionsCatalog::new(vec![Category::new(
//!     "titles",
//!     vec![MetadataNode::group(GroupNode::new(vec![MetadataNode::leaf(LeafNode::new("title--text"))]))],
//! )]);
//! let mut customizer = ChartCustomizer::new(CustomizerSources::new(catalog), CustomizerConfig::default());
//! customizer.init(json!({"title": {"text": "Rainfall"}}), None);
//!
//! let field = customizer.body().find_field("title--text").unwrap();
//! assert_eq!(field.value, json!("Rainfall"));
//!
//! let handle = field.handle;
//! customizer.commit(handle, json!("Rainfall 2024")).unwrap();
//! assert_eq!(customizer.options().get("title--text", None), Some(&json!("Rainfall 2024")));
//! ```

use std::rc::Rc;
use std::time::Instant;

use serde_json::Value;

use plotcraft_meta::{AdvancedTree, AllowList, Dictionary, MetadataNode, OptionsCatalog, OptionsState};

use crate::config::CustomizerConfig;
use crate::error::{UiError, UiResult};
use crate::events::{EventEmitter, ListenerId, PropertyChange};
use crate::field::{FieldHandle, FieldRenderer, InspectorField};
use crate::form::{filter_value_of, node_at, rerender_group, Binding, BindingRegistry, FilterContext, FormBuilder};
use crate::highlight::Highlighter;
use crate::routing::{discriminator_value, render_advanced, AdvancedSelection};
use crate::selection::{OptionsTree, SelectionList, TreeEvent};
use crate::surface::{Panel, SlotId, View};

/// Static inputs shared between widgets
#[derive(Debug, Clone)]
pub struct CustomizerSources {
    pub catalog: Rc<OptionsCatalog>,
    pub advanced: Option<Rc<AdvancedTree>>,
    pub dictionary: Rc<Dictionary>,
}

impl CustomizerSources {
    /// Sources with just a category catalog
    #[must_use]
    pub fn new(catalog: OptionsCatalog) -> Self {
        Self {
            catalog: Rc::new(catalog),
            advanced: None,
            dictionary: Rc::new(Dictionary::new()),
        }
    }

    #[must_use]
    pub fn with_advanced(mut self, tree: AdvancedTree) -> Self {
        self.advanced = Some(Rc::new(tree));
        self
    }

    #[must_use]
    pub fn with_dictionary(mut self, dictionary: Dictionary) -> Self {
        self.dictionary = Rc::new(dictionary);
        self
    }
}

/// Where [`ChartCustomizer::focus`] should take the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusTarget {
    /// Category to select
    pub tab: String,
    /// Field to reveal
    pub id: String,
}

impl FocusTarget {
    #[must_use]
    pub fn new(tab: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            tab: tab.into(),
            id: id.into(),
        }
    }
}

/// Chart options editor
pub struct ChartCustomizer {
    catalog: Rc<OptionsCatalog>,
    advanced_tree: Option<Rc<AdvancedTree>>,
    dictionary: Rc<Dictionary>,
    config: CustomizerConfig,
    allow: AllowList,
    renderer: Box<dyn FieldRenderer>,
    options: OptionsState,
    categories: SelectionList,
    tree: OptionsTree,
    body: Panel,
    advanced: Panel,
    advanced_selection: Option<AdvancedSelection>,
    bindings: BindingRegistry,
    highlighter: Highlighter,
    scroll_target: Option<(View, String)>,
    events: EventEmitter<PropertyChange>,
}

impl ChartCustomizer {
    /// Create a customizer over empty options and select the first category
    #[must_use]
    pub fn new(sources: CustomizerSources, config: CustomizerConfig) -> Self {
        let advanced_tree = sources.advanced.map(|tree| {
            if config.discriminators.is_empty() {
                tree
            } else {
                Rc::new((*tree).clone().with_discriminators(&config.discriminators))
            }
        });

        let mut customizer = Self {
            catalog: sources.catalog,
            advanced_tree,
            dictionary: sources.dictionary,
            allow: config.available_settings.iter().cloned().collect(),
            highlighter: Highlighter::new(config.highlight_duration()),
            config,
            renderer: Box::new(InspectorField),
            options: OptionsState::default(),
            categories: SelectionList::new(),
            tree: OptionsTree::new(),
            body: Panel::new(),
            advanced: Panel::new(),
            advanced_selection: None,
            bindings: BindingRegistry::new(),
            scroll_target: None,
            events: EventEmitter::new(),
        };
        customizer.build();
        customizer
    }

    /// Replace the field renderer and re-render both views
    #[must_use]
    pub fn with_renderer<R: FieldRenderer + 'static>(mut self, renderer: R) -> Self {
        self.renderer = Box::new(renderer);
        self.reselect();
        self.render_advanced_selection();
        self
    }

    fn build(&mut self) {
        self.categories.clear();
        for category in self.catalog.categories() {
            if !self.allow.should_include_any(&category.groups) {
                tracing::trace!(category = %category.id, "category has no allowed leaves");
                continue;
            }
            let title = self.dictionary.lookup(category.title.as_deref().unwrap_or(&category.id));
            self.categories.add_item(category.id.clone(), title);
        }

        if self.categories.select_first().is_some() {
            self.reselect();
        }
        self.rebuild_tree();
        tracing::debug!(categories = self.categories.len(), advanced = self.advanced_enabled(), "customizer built");
    }

    /// Whether the advanced view is available
    #[must_use]
    pub fn advanced_enabled(&self) -> bool {
        !self.config.no_advanced && !self.config.compact && self.advanced_tree.is_some()
    }

    /// Load new chart options and refresh both views.
    ///
    /// `full` is the complete options document when the host keeps one
    /// apart from the flat editing copy; it takes precedence.
    pub fn init(&mut self, flat: Value, full: Option<Value>) {
        self.options.replace(full.unwrap_or(flat));
        self.highlighter.clear();
        self.reselect();
        self.rebuild_tree();
    }

    /// Re-initialize from the current options
    pub fn refresh(&mut self) {
        let current = self.options.value().clone();
        self.init(current, None);
    }

    /// The host switched back to the customizer tab
    pub fn on_tab_focus(&mut self) {
        self.refresh();
    }

    /// Show the category with `id`
    pub fn select_category(&mut self, id: &str) -> UiResult<()> {
        if !self.categories.select(id) {
            return Err(UiError::UnknownCategory(id.to_string()));
        }
        self.reselect();
        Ok(())
    }

    /// Re-render the selected category
    pub fn reselect(&mut self) {
        self.render_category(&FilterContext::default());
    }

    /// Re-render the whole selected category under an explicit filter
    pub fn apply_filter(&mut self, detail_index: Option<usize>, filtered_by: &str, filter_value: Option<String>) {
        let ctx = FilterContext {
            detail_index,
            filtered_by: Some(filtered_by.to_string()),
            filter_value: filter_value.filter(|value| !value.is_empty()),
            filter_owner: None,
        };
        self.render_category(&ctx);
    }

    fn render_category(&mut self, ctx: &FilterContext) {
        let Some(id) = self.categories.selected_id().map(str::to_string) else {
            return;
        };
        let catalog = Rc::clone(&self.catalog);
        let Some(category) = catalog.category(&id) else {
            return;
        };

        self.bindings.release(self.body.handles());
        self.body.clear();
        self.body.heading = self.categories.selected().map(|item| item.title.clone());

        let mut builder = FormBuilder::new(
            &self.options,
            &self.allow,
            &self.dictionary,
            self.renderer.as_ref(),
            &mut self.bindings,
        );
        builder.render_all(&category.groups, &mut self.body.elements, ctx);
        tracing::debug!(category = %id, fields = self.body.field_count(), "category rendered");
    }

    fn refilter_group(&mut self, slot: &SlotId, filter_value: Option<String>) -> bool {
        let Some(id) = self.categories.selected_id().map(str::to_string) else {
            return false;
        };
        let catalog = Rc::clone(&self.catalog);
        let Some(category) = catalog.category(&id) else {
            return false;
        };
        let Some(target) = self.body.group_mut(slot) else {
            return false;
        };

        let mut ctx = target.context.clone();
        ctx.filter_value = filter_value;
        tracing::debug!(%slot, filter = ?ctx.filter_value, "re-rendering filtered group");

        let mut builder = FormBuilder::new(
            &self.options,
            &self.allow,
            &self.dictionary,
            self.renderer.as_ref(),
            &mut self.bindings,
        );
        rerender_group(&mut builder, &category.groups, target, ctx)
    }

    /// Choose which array element the controlled group at `slot` edits
    pub fn select_master(&mut self, slot: &SlotId, index: usize) -> UiResult<()> {
        let id = self
            .categories
            .selected_id()
            .map(str::to_string)
            .ok_or_else(|| UiError::UnknownSlot(slot.clone()))?;
        let catalog = Rc::clone(&self.catalog);
        let nodes = catalog.category(&id).map(|c| c.groups.as_slice()).unwrap_or_default();
        let group = node_at(nodes, slot)
            .and_then(MetadataNode::as_group)
            .ok_or_else(|| UiError::UnknownSlot(slot.clone()))?;
        let target = self.body.group_mut(slot).ok_or_else(|| UiError::UnknownSlot(slot.clone()))?;

        let Some(master) = target.master.as_mut().filter(|m| index < m.labels.len()) else {
            return Err(UiError::InvalidSelection {
                slot: slot.clone(),
                index,
            });
        };
        master.selected = index;

        let mut ctx = target.context.clone();
        ctx.detail_index = Some(index);
        if let Some(path) = &group.filtered_by {
            ctx.filter_value = self.options.get(path, Some(index)).and_then(filter_value_of);
        }

        let mut builder = FormBuilder::new(
            &self.options,
            &self.allow,
            &self.dictionary,
            self.renderer.as_ref(),
            &mut self.bindings,
        );
        rerender_group(&mut builder, nodes, target, ctx);
        tracing::debug!(%slot, index, "master selection changed");
        Ok(())
    }

    /// Apply a user edit reported for the control with `handle`
    pub fn commit(&mut self, handle: FieldHandle, value: Value) -> UiResult<()> {
        let binding = self.bindings.get(handle).cloned().ok_or(UiError::UnknownField(handle))?;
        tracing::debug!(%handle, field = binding.field_id(), "committing field");

        match binding {
            Binding::Simple {
                field_id,
                detail_index,
                filtered_by,
                filter_owner,
            } => {
                self.options.set(&field_id, value.clone(), detail_index);
                if let Some(control) = self.body.field_by_handle_mut(handle) {
                    control.value = value.clone();
                }
                self.events.emit(&PropertyChange::new(&field_id, value.clone(), detail_index));

                if filtered_by.as_deref() == Some(field_id.as_str()) {
                    let filter_value = filter_value_of(&value);
                    match filter_owner {
                        Some(slot) => {
                            self.refilter_group(&slot, filter_value);
                        }
                        None => self.apply_filter(detail_index, &field_id, filter_value),
                    }
                }
            }
            Binding::Advanced {
                field_id,
                arr_index,
                discriminator,
                ..
            } => {
                self.options.set(&field_id, value.clone(), arr_index);
                if let Some(control) = self.advanced.field_by_handle_mut(handle) {
                    control.value = value.clone();
                }
                self.events.emit(&PropertyChange::new(&field_id, value.clone(), arr_index));

                if discriminator {
                    if let Some(selection) = self.advanced_selection.as_mut() {
                        selection.filter = filter_value_of(&value);
                    }
                    self.render_advanced_selection();
                }
            }
        }
        Ok(())
    }

    fn rebuild_tree(&mut self) {
        match &self.advanced_tree {
            Some(tree) if self.advanced_enabled() => self.tree.build(tree, &self.options),
            _ => self.tree.clear(),
        }

        let still_shown = self
            .advanced_selection
            .as_ref()
            .is_some_and(|s| self.tree.contains(&s.node_id, s.arr_index));
        if still_shown {
            if let (Some(tree), Some(selection)) = (&self.advanced_tree, self.advanced_selection.as_mut()) {
                if let Some(node) = tree.find(&selection.node_id) {
                    selection.filter = discriminator_value(node, &self.options, selection.arr_index);
                }
            }
            self.render_advanced_selection();
        } else {
            self.advanced_selection = None;
            self.bindings.release(self.advanced.handles());
            self.advanced.clear();
        }
    }

    /// Show the entries of an option-tree node
    pub fn select_advanced(&mut self, node_id: &str, arr_index: Option<usize>) -> UiResult<()> {
        if !self.advanced_enabled() || !self.tree.select(node_id, arr_index) {
            return Err(UiError::UnknownAdvancedNode(node_id.to_string()));
        }
        let node = self
            .advanced_tree
            .as_ref()
            .and_then(|tree| tree.find(node_id))
            .ok_or_else(|| UiError::UnknownAdvancedNode(node_id.to_string()))?;

        self.advanced_selection = Some(AdvancedSelection {
            node_id: node_id.to_string(),
            arr_index,
            filter: discriminator_value(node, &self.options, arr_index),
        });
        self.render_advanced_selection();
        Ok(())
    }

    fn render_advanced_selection(&mut self) {
        let (Some(tree), Some(selection)) = (&self.advanced_tree, &self.advanced_selection) else {
            return;
        };
        if let Some(node) = tree.find(&selection.node_id) {
            render_advanced(
                node,
                selection,
                &self.options,
                self.renderer.as_ref(),
                &mut self.bindings,
                &mut self.advanced,
            );
        }
    }

    /// React to a notification from the option tree
    pub fn handle_tree_event(&mut self, event: TreeEvent) -> UiResult<()> {
        match event {
            TreeEvent::Select { node_id, arr_index } => self.select_advanced(&node_id, arr_index),
            TreeEvent::DataUpdate { path, value } => {
                self.events.emit(&PropertyChange::new(path, value, None));
                Ok(())
            }
            TreeEvent::Dirty => {
                self.refresh();
                Ok(())
            }
        }
    }

    /// Emphasize the field `id` in every view showing it
    pub fn highlight_field(&mut self, id: &str) -> Vec<View> {
        self.highlight_field_at(id, Instant::now())
    }

    /// [`Self::highlight_field`] with an explicit clock.
    ///
    /// Only ids containing `-` name navigable fields. Returns the views
    /// the field was found in.
    pub fn highlight_field_at(&mut self, id: &str, now: Instant) -> Vec<View> {
        if !id.contains('-') {
            return Vec::new();
        }

        let mut found = Vec::new();
        if self.body.find_field(id).is_some() {
            found.push(View::Simple);
        }
        if self.advanced.find_field(id).is_some() {
            found.push(View::Advanced);
        }
        for view in &found {
            self.highlighter.emphasize(*view, id, now);
        }
        if let Some(view) = found.first() {
            self.scroll_target = Some((*view, id.to_string()));
        }

        let prefix = id.split_once('-').map_or(id, |(prefix, _)| prefix);
        self.tree.scroll_to(prefix);
        found
    }

    /// Select the target's category, reveal it in the option tree and
    /// highlight it
    pub fn focus(&mut self, target: &FocusTarget) -> UiResult<Vec<View>> {
        self.focus_at(target, Instant::now())
    }

    /// [`Self::focus`] with an explicit clock
    pub fn focus_at(&mut self, target: &FocusTarget, now: Instant) -> UiResult<Vec<View>> {
        self.select_category(&target.tab)?;
        if self.advanced_enabled() {
            self.tree.expand_to(&target.id);
        }
        Ok(self.highlight_field_at(&target.id, now))
    }

    /// Whether `id` is emphasized in `view` at `now`
    #[must_use]
    pub fn is_highlighted(&self, view: View, id: &str, now: Instant) -> bool {
        self.highlighter.is_emphasized(view, id, now)
    }

    /// Drop expired emphasis
    pub fn expire_highlights(&mut self, now: Instant) -> usize {
        self.highlighter.expire(now)
    }

    /// Subscribe to property changes
    pub fn on<F>(&self, listener: F) -> ListenerId
    where
        F: FnMut(&PropertyChange) + 'static,
    {
        self.events.on(listener)
    }

    /// Unsubscribe a listener
    pub fn off(&self, id: ListenerId) -> bool {
        self.events.off(id)
    }

    #[must_use]
    pub fn events(&self) -> &EventEmitter<PropertyChange> {
        &self.events
    }

    #[must_use]
    pub fn options(&self) -> &OptionsState {
        &self.options
    }

    #[must_use]
    pub fn config(&self) -> &CustomizerConfig {
        &self.config
    }

    #[must_use]
    pub fn categories(&self) -> &SelectionList {
        &self.categories
    }

    /// Form of the selected category
    #[must_use]
    pub fn body(&self) -> &Panel {
        &self.body
    }

    /// Entry list of the selected option-tree node
    #[must_use]
    pub fn advanced_panel(&self) -> &Panel {
        &self.advanced
    }

    #[must_use]
    pub fn tree(&self) -> &OptionsTree {
        &self.tree
    }

    #[must_use]
    pub fn advanced_selection(&self) -> Option<&AdvancedSelection> {
        self.advanced_selection.as_ref()
    }

    /// Field most recently scrolled into view
    #[must_use]
    pub fn scroll_target(&self) -> Option<(View, &str)> {
        self.scroll_target.as_ref().map(|(view, id)| (*view, id.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plotcraft_meta::{AdvancedEntry, AdvancedNode, Category, GroupNode, LeafNode};
    use serde_json::json;

    fn catalog() -> OptionsCatalog {
        OptionsCatalog::new(vec![
            Category::new(
                "general",
                vec![MetadataNode::group(
                    GroupNode::new(vec![MetadataNode::leaf(LeafNode::new("title--text"))]).with_text("Titles"),
                )],
            ),
            Category::new(
                "hidden",
                vec![MetadataNode::group(GroupNode::new(vec![MetadataNode::leaf(LeafNode::new("credits--text"))]))],
            ),
        ])
    }

    fn advanced() -> AdvancedTree {
        AdvancedTree::new(vec![
            AdvancedNode::new("title").with_entry(AdvancedEntry::new("title--text", "text")),
            AdvancedNode::new("series")
                .array()
                .with_entry(AdvancedEntry::new("series--type", "type")),
        ])
    }

    #[test]
    fn test_categories_respect_allow_list() {
        let config = CustomizerConfig {
            available_settings: vec!["title--text".to_string()],
            ..CustomizerConfig::default()
        };
        let customizer = ChartCustomizer::new(CustomizerSources::new(catalog()), config);
        let ids: Vec<&str> = customizer.categories().items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["general"]);
        assert_eq!(customizer.categories().selected_id(), Some("general"));
    }

    #[test]
    fn test_unknown_category() {
        let mut customizer = ChartCustomizer::new(CustomizerSources::new(catalog()), CustomizerConfig::default());
        assert!(matches!(customizer.select_category("nope"), Err(UiError::UnknownCategory(_))));
        customizer.select_category("hidden").unwrap();
        assert_eq!(customizer.body().field_ids(), vec!["credits--text"]);
    }

    #[test]
    fn test_advanced_view_availability() {
        let sources = CustomizerSources::new(catalog()).with_advanced(advanced());
        assert!(ChartCustomizer::new(sources.clone(), CustomizerConfig::default()).advanced_enabled());

        let compact = CustomizerConfig {
            compact: true,
            ..CustomizerConfig::default()
        };
        let mut customizer = ChartCustomizer::new(sources, compact);
        assert!(!customizer.advanced_enabled());
        assert!(matches!(
            customizer.select_advanced("title", None),
            Err(UiError::UnknownAdvancedNode(_))
        ));

        let plain = ChartCustomizer::new(CustomizerSources::new(catalog()), CustomizerConfig::default());
        assert!(!plain.advanced_enabled());
    }

    #[test]
    fn test_init_prefers_full_options() {
        let mut customizer = ChartCustomizer::new(CustomizerSources::new(catalog()), CustomizerConfig::default());
        customizer.init(json!({"title": {"text": "flat"}}), Some(json!({"title": {"text": "full"}})));
        assert_eq!(customizer.body().find_field("title--text").unwrap().value, json!("full"));

        customizer.init(json!({"title": {"text": "flat"}}), None);
        assert_eq!(customizer.body().find_field("title--text").unwrap().value, json!("flat"));
    }

    #[test]
    fn test_stale_handle_rejected() {
        let mut customizer = ChartCustomizer::new(CustomizerSources::new(catalog()), CustomizerConfig::default());
        let handle = customizer.body().find_field("title--text").unwrap().handle;
        customizer.reselect();
        assert!(matches!(
            customizer.commit(handle, json!("late")),
            Err(UiError::UnknownField(h)) if h == handle
        ));
    }

    #[test]
    fn test_tree_data_update_publishes() {
        let customizer_events = Rc::new(std::cell::RefCell::new(Vec::new()));
        let sink = customizer_events.clone();
        let mut customizer = ChartCustomizer::new(
            CustomizerSources::new(catalog()).with_advanced(advanced()),
            CustomizerConfig::default(),
        );
        customizer.on(move |change: &PropertyChange| sink.borrow_mut().push(change.clone()));

        customizer
            .handle_tree_event(TreeEvent::DataUpdate {
                path: "legend--enabled".to_string(),
                value: json!(false),
            })
            .unwrap();
        assert_eq!(
            *customizer_events.borrow(),
            vec![PropertyChange::new("legend--enabled", json!(false), None)]
        );
    }

    #[test]
    fn test_highlight_requires_dash() {
        let mut customizer = ChartCustomizer::new(CustomizerSources::new(catalog()), CustomizerConfig::default());
        let now = Instant::now();
        assert!(customizer.highlight_field_at("title", now).is_empty());
        assert_eq!(customizer.highlight_field_at("title--text", now), vec![View::Simple]);
        assert_eq!(customizer.scroll_target(), Some((View::Simple, "title--text")));
    }
}
