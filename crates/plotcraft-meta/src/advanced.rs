//! Option tree for the advanced view
//!
//! The advanced view exposes the full option reference as a tree. Each
//! node lists flat entries; a node may name one of its entries as the
//! sub-type discriminator, whose value filters which sibling entries are
//! shown (e.g. `series--type` gating line-only or bar-only options).

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::error::MetaResult;
use crate::node::deserialize_sub_type;
use crate::options::OptionsState;

/// One editable option in the advanced view
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedEntry {
    /// Option path
    pub id: String,
    /// Short name; entries with an empty short name are internal and hidden
    #[serde(default)]
    pub short_name: String,
    /// Field type (defaults to `string`)
    #[serde(default)]
    pub data_type: Option<String>,
    /// Enumerated choices
    #[serde(default)]
    pub values: Option<Vec<Value>>,
    /// Declared default
    #[serde(default)]
    pub defaults: Value,
    /// Tooltip text
    #[serde(default)]
    pub description: Option<String>,
    /// Discriminator values under which this entry is visible
    #[serde(default, deserialize_with = "deserialize_sub_type")]
    pub sub_type: BTreeSet<String>,
    /// Renderer attributes
    #[serde(default)]
    pub attributes: Vec<Value>,
}

/// A node of the advanced option tree
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedNode {
    /// Node id (an option path prefix such as `series` or `xAxis`)
    pub id: String,
    /// Display title; the id is used when absent
    #[serde(default)]
    pub title: Option<String>,
    /// Whether the option is an array with one tree item per element
    #[serde(default)]
    pub is_array: bool,
    /// Entry id acting as the sub-type discriminator for this node
    #[serde(default)]
    pub discriminator: Option<String>,
    /// Editable entries
    #[serde(default)]
    pub entries: Vec<AdvancedEntry>,
    /// Child nodes
    #[serde(default)]
    pub children: Vec<AdvancedNode>,
}

/// The advanced option tree
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AdvancedTree {
    #[serde(default)]
    children: Vec<AdvancedNode>,
}

impl AdvancedEntry {
    /// Create an entry with a visible short name
    #[must_use]
    pub fn new(id: impl Into<String>, short_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            short_name: short_name.into(),
            data_type: None,
            values: None,
            defaults: Value::Null,
            description: None,
            sub_type: BTreeSet::new(),
            attributes: Vec::new(),
        }
    }

    /// Restrict the entry to the given discriminator values
    #[must_use]
    pub fn with_sub_type<I, S>(mut self, sub_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sub_type = sub_types.into_iter().map(Into::into).collect();
        self
    }

    /// Set the declared default
    #[must_use]
    pub fn with_defaults(mut self, defaults: Value) -> Self {
        self.defaults = defaults;
        self
    }

    /// Field kind handed to the renderer
    #[must_use]
    pub fn kind(&self) -> &str {
        if self.values.is_some() {
            "options"
        } else {
            self.data_type.as_deref().unwrap_or("string")
        }
    }

    /// Whether the entry is shown at all
    #[must_use]
    pub fn is_exposed(&self) -> bool {
        !self.short_name.is_empty()
    }

    /// Whether the entry is visible while `filter` is active
    #[must_use]
    pub fn admits_filter(&self, filter: Option<&str>) -> bool {
        match filter {
            Some(filter) if !self.sub_type.is_empty() => self.sub_type.contains(filter),
            _ => true,
        }
    }

    /// Current value, falling back to the declared default
    #[must_use]
    pub fn resolve_value(&self, options: &OptionsState, arr_index: Option<usize>) -> Value {
        options
            .get(&self.id, arr_index)
            .filter(|v| !v.is_null())
            .unwrap_or(&self.defaults)
            .clone()
    }
}

impl AdvancedNode {
    /// Create a node
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            is_array: false,
            discriminator: None,
            entries: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Mark the node as array-valued
    #[must_use]
    pub fn array(mut self) -> Self {
        self.is_array = true;
        self
    }

    /// Name the discriminator entry
    #[must_use]
    pub fn with_discriminator(mut self, entry_id: impl Into<String>) -> Self {
        self.discriminator = Some(entry_id.into());
        self
    }

    /// Add an entry
    #[must_use]
    pub fn with_entry(mut self, entry: AdvancedEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Add a child node
    #[must_use]
    pub fn with_child(mut self, child: AdvancedNode) -> Self {
        self.children.push(child);
        self
    }

    /// Display title
    #[must_use]
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.id)
    }
}

impl AdvancedTree {
    /// Build a tree from its top-level nodes
    #[must_use]
    pub fn new(children: Vec<AdvancedNode>) -> Self {
        Self { children }
    }

    /// Parse a tree from a JSON string
    pub fn from_json_str(json: &str) -> MetaResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a tree from a JSON file
    pub fn from_path(path: &Path) -> MetaResult<Self> {
        crate::read_json(path)
    }

    /// Top-level nodes
    #[must_use]
    pub fn nodes(&self) -> &[AdvancedNode] {
        &self.children
    }

    /// Whether the tree has no nodes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Find a node by id (depth first)
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&AdvancedNode> {
        fn walk<'a>(nodes: &'a [AdvancedNode], id: &str) -> Option<&'a AdvancedNode> {
            nodes
                .iter()
                .find_map(|node| if node.id == id { Some(node) } else { walk(&node.children, id) })
        }
        walk(&self.children, id)
    }

    /// Ids of the nodes from the root down to the node with `id`, inclusive
    #[must_use]
    pub fn path_to(&self, id: &str) -> Option<Vec<String>> {
        fn walk(nodes: &[AdvancedNode], id: &str, trail: &mut Vec<String>) -> bool {
            for node in nodes {
                trail.push(node.id.clone());
                if node.id == id || walk(&node.children, id, trail) {
                    return true;
                }
                trail.pop();
            }
            false
        }

        let mut trail = Vec::new();
        walk(&self.children, id, &mut trail).then_some(trail)
    }

    /// Override discriminator entries by node id.
    ///
    /// Applied once after loading so that rendering never compares field
    /// ids against fixed strings.
    #[must_use]
    pub fn with_discriminators(mut self, overrides: &HashMap<String, String>) -> Self {
        fn apply(nodes: &mut [AdvancedNode], overrides: &HashMap<String, String>) {
            for node in nodes {
                if let Some(entry_id) = overrides.get(&node.id) {
                    node.discriminator = Some(entry_id.clone());
                }
                apply(&mut node.children, overrides);
            }
        }

        if !overrides.is_empty() {
            tracing::debug!(count = overrides.len(), "applying discriminator overrides");
            apply(&mut self.children, overrides);
        }
        self
    }
}
