//! Selection models
//!
//! [`SelectionList`] backs the category list of the simple view and the
//! group list of the template picker. [`OptionsTree`] backs the advanced
//! view's option tree, where array-valued nodes expand into one item per
//! array element.

use std::collections::BTreeSet;

use serde_json::Value;

use plotcraft_meta::{options::path_segments, AdvancedNode, AdvancedTree, OptionsState};

/// An entry of a [`SelectionList`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub id: String,
    pub title: String,
}

/// Ordered list with at most one selected item
#[derive(Debug, Clone, Default)]
pub struct SelectionList {
    items: Vec<ListItem>,
    selected: Option<usize>,
}

impl SelectionList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item
    pub fn add_item(&mut self, id: impl Into<String>, title: impl Into<String>) {
        self.items.push(ListItem {
            id: id.into(),
            title: title.into(),
        });
    }

    /// Remove all items and the selection
    pub fn clear(&mut self) {
        self.items.clear();
        self.selected = None;
    }

    #[must_use]
    pub fn items(&self) -> &[ListItem] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Select the item with `id`. Returns false if it is not listed.
    pub fn select(&mut self, id: &str) -> bool {
        match self.items.iter().position(|item| item.id == id) {
            Some(position) => {
                self.selected = Some(position);
                true
            }
            None => false,
        }
    }

    /// Select the first item, if any
    pub fn select_first(&mut self) -> Option<&ListItem> {
        self.selected = if self.items.is_empty() { None } else { Some(0) };
        self.selected()
    }

    /// The selected item
    #[must_use]
    pub fn selected(&self) -> Option<&ListItem> {
        self.selected.and_then(|i| self.items.get(i))
    }

    /// Id of the selected item
    #[must_use]
    pub fn selected_id(&self) -> Option<&str> {
        self.selected().map(|item| item.id.as_str())
    }
}

/// Commands and notifications originating in the option tree
#[derive(Debug, Clone, PartialEq)]
pub enum TreeEvent {
    /// A node (or array element) was selected
    Select { node_id: String, arr_index: Option<usize> },
    /// The tree edited an option directly
    DataUpdate { path: String, value: Value },
    /// The tree's data went stale and needs a rebuild
    Dirty,
}

/// One visible row of the option tree
#[derive(Debug, Clone, PartialEq)]
pub struct TreeItem {
    pub node_id: String,
    pub title: String,
    /// Array element this row stands for
    pub arr_index: Option<usize>,
    pub children: Vec<TreeItem>,
}

/// Option tree model for the advanced view
#[derive(Debug, Clone, Default)]
pub struct OptionsTree {
    items: Vec<TreeItem>,
    expanded: BTreeSet<String>,
    selected: Option<(String, Option<usize>)>,
    scroll_target: Option<String>,
}

impl OptionsTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the rows from the tree and the current options.
    ///
    /// Expansion state and the selection survive while their nodes still
    /// exist.
    pub fn build(&mut self, tree: &AdvancedTree, options: &OptionsState) {
        self.items = tree.nodes().iter().map(|node| build_item(node, options, None)).collect();

        let items = &self.items;
        self.expanded.retain(|id| find_item(items, id, None).is_some());
        if let Some((id, index)) = &self.selected {
            if find_item(items, id, *index).is_none() {
                self.selected = None;
            }
        }
        tracing::debug!(rows = self.items.len(), "option tree rebuilt");
    }

    /// Drop every row
    pub fn clear(&mut self) {
        self.items.clear();
        self.expanded.clear();
        self.selected = None;
        self.scroll_target = None;
    }

    #[must_use]
    pub fn items(&self) -> &[TreeItem] {
        &self.items
    }

    /// Whether a row for `node_id` and `arr_index` exists
    #[must_use]
    pub fn contains(&self, node_id: &str, arr_index: Option<usize>) -> bool {
        find_item(&self.items, node_id, arr_index).is_some()
    }

    /// Select a row. Returns false if no such row exists.
    pub fn select(&mut self, node_id: &str, arr_index: Option<usize>) -> bool {
        if !self.contains(node_id, arr_index) {
            return false;
        }
        self.selected = Some((node_id.to_string(), arr_index));
        true
    }

    /// The selected row's node id and array index
    #[must_use]
    pub fn selected(&self) -> Option<(&str, Option<usize>)> {
        self.selected.as_ref().map(|(id, index)| (id.as_str(), *index))
    }

    /// Expand every ancestor of the deepest node matching `id`.
    ///
    /// `id` may be a field path; trailing segments are dropped until a
    /// node matches. Returns the id of the node expanded to.
    pub fn expand_to(&mut self, id: &str) -> Option<String> {
        let segments = path_segments(id);
        for len in (1..=segments.len()).rev() {
            let candidate = segments[..len].join("--");
            let Some(trail) = trail_to(&self.items, &candidate) else {
                continue;
            };
            tracing::trace!(node = %candidate, "expanding option tree");
            self.expanded.extend(trail);
            return Some(candidate);
        }
        None
    }

    #[must_use]
    pub fn is_expanded(&self, node_id: &str) -> bool {
        self.expanded.contains(node_id)
    }

    /// Record `node_id` as the row to scroll into view
    pub fn scroll_to(&mut self, node_id: &str) -> bool {
        if find_item(&self.items, node_id, None).is_none() && trail_to(&self.items, node_id).is_none() {
            return false;
        }
        self.scroll_target = Some(node_id.to_string());
        true
    }

    #[must_use]
    pub fn scroll_target(&self) -> Option<&str> {
        self.scroll_target.as_deref()
    }
}

fn build_item(node: &AdvancedNode, options: &OptionsState, arr_index: Option<usize>) -> TreeItem {
    let children = if node.is_array {
        let count = options
            .get(&node.id, None)
            .and_then(Value::as_array)
            .map_or(0, Vec::len);
        (0..count)
            .map(|index| TreeItem {
                node_id: node.id.clone(),
                title: element_title(node, options, index),
                arr_index: Some(index),
                children: node
                    .children
                    .iter()
                    .map(|child| build_item(child, options, Some(index)))
                    .collect(),
            })
            .collect()
    } else {
        node.children
            .iter()
            .map(|child| build_item(child, options, arr_index))
            .collect()
    };

    TreeItem {
        node_id: node.id.clone(),
        title: node.display_title().to_string(),
        arr_index,
        children,
    }
}

fn element_title(node: &AdvancedNode, options: &OptionsState, index: usize) -> String {
    let element = options
        .get(&node.id, None)
        .and_then(Value::as_array)
        .and_then(|items| items.get(index));
    match element.and_then(|e| e.get("name")).and_then(Value::as_str) {
        Some(name) => name.to_string(),
        None => format!("{} #{}", node.display_title(), index + 1),
    }
}

fn find_item<'a>(items: &'a [TreeItem], node_id: &str, arr_index: Option<usize>) -> Option<&'a TreeItem> {
    items.iter().find_map(|item| {
        if item.node_id == node_id && item.arr_index == arr_index {
            Some(item)
        } else {
            find_item(&item.children, node_id, arr_index)
        }
    })
}

fn trail_to(items: &[TreeItem], node_id: &str) -> Option<Vec<String>> {
    fn walk(items: &[TreeItem], node_id: &str, trail: &mut Vec<String>) -> bool {
        for item in items {
            trail.push(item.node_id.clone());
            if item.node_id == node_id || walk(&item.children, node_id, trail) {
                return true;
            }
            trail.pop();
        }
        false
    }
    let mut trail = Vec::new();
    walk(items, node_id, &mut trail).then_some(trail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use plotcraft_meta::AdvancedEntry;
    use serde_json::json;

    fn tree() -> AdvancedTree {
        AdvancedTree::new(vec![
            AdvancedNode::new("chart").with_entry(AdvancedEntry::new("chart--type", "type")),
            AdvancedNode::new("series")
                .array()
                .with_child(AdvancedNode::new("series--marker")),
        ])
    }

    #[test]
    fn test_list_selection() {
        let mut list = SelectionList::new();
        assert!(list.select_first().is_none());

        list.add_item("general", "General");
        list.add_item("axes", "Axes");
        assert_eq!(list.select_first().unwrap().id, "general");
        assert!(list.select("axes"));
        assert!(!list.select("nope"));
        assert_eq!(list.selected_id(), Some("axes"));

        list.clear();
        assert!(list.selected().is_none());
        assert!(list.is_empty());
    }

    #[test]
    fn test_array_nodes_expand_per_element() {
        let options = OptionsState::new(json!({"series": [{"name": "Tokyo"}, {}]}));
        let mut model = OptionsTree::new();
        model.build(&tree(), &options);

        let series = &model.items()[1];
        assert_eq!(series.children.len(), 2);
        assert_eq!(series.children[0].title, "Tokyo");
        assert_eq!(series.children[1].title, "series #2");
        assert_eq!(series.children[1].children[0].arr_index, Some(1));

        assert!(model.contains("series--marker", Some(1)));
        assert!(!model.contains("series--marker", Some(2)));
    }

    #[test]
    fn test_select_and_rebuild() {
        let mut model = OptionsTree::new();
        model.build(&tree(), &OptionsState::new(json!({"series": [{}]})));
        assert!(model.select("series", Some(0)));
        assert!(!model.select("series", Some(4)));
        assert_eq!(model.selected(), Some(("series", Some(0))));

        model.build(&tree(), &OptionsState::new(json!({"series": []})));
        assert!(model.selected().is_none());
    }

    #[test]
    fn test_expand_to_trims_field_path() {
        let mut model = OptionsTree::new();
        model.build(&tree(), &OptionsState::new(json!({"series": [{}]})));

        assert_eq!(model.expand_to("series--marker--radius").as_deref(), Some("series--marker"));
        assert!(model.is_expanded("series"));
        assert!(model.is_expanded("series--marker"));
        assert!(!model.is_expanded("chart"));
        assert!(model.expand_to("legend--enabled").is_none());
    }

    #[test]
    fn test_scroll_to() {
        let mut model = OptionsTree::new();
        model.build(&tree(), &OptionsState::new(json!({})));
        assert!(model.scroll_to("chart"));
        assert_eq!(model.scroll_target(), Some("chart"));
        assert!(!model.scroll_to("credits"));
        assert_eq!(model.scroll_target(), Some("chart"));
    }
}
