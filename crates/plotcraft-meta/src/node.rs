//! Metadata tree nodes
//!
//! The option schema is a tree of groups and leaves. On disk a node is a
//! JSON object; an object carrying an `options` array is a group, an object
//! carrying an `id` is a leaf, and anything else is dropped while loading.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::options::OptionsState;

/// A node of the option schema tree
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataNode {
    /// An ordered collection of child nodes
    Group(GroupNode),
    /// A single editable property
    Leaf(LeafNode),
}

/// A group of metadata nodes, optionally gated by a master selector
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupNode {
    /// Heading shown above the group (a dictionary key)
    pub text: Option<String>,
    /// Child nodes in render order
    pub children: Vec<MetadataNode>,
    /// Master selector choosing which array element the group edits
    pub controlled_by: Option<ControlledBy>,
    /// Option path whose value gates which children are visible
    pub filtered_by: Option<String>,
}

/// Master selector definition for a group
#[derive(Debug, Clone, PartialEq)]
pub struct ControlledBy {
    /// Where the selector's candidates come from
    pub source: CandidateSource,
    /// Field of each candidate used as its label
    pub options_title: Option<String>,
}

/// Candidate list source for a master selector
#[derive(Debug, Clone, PartialEq)]
pub enum CandidateSource {
    /// Read the candidates from the options state at this path
    Path(String),
    /// Fixed candidates declared in the metadata
    Inline(Vec<Value>),
}

/// A single editable chart property
#[derive(Debug, Clone, PartialEq)]
pub struct LeafNode {
    /// Option path edited by this leaf (e.g. `series--type`)
    pub id: String,
    /// Key used to look up the localized title and tooltip
    pub pid: String,
    /// Field type handed to the field renderer
    pub data_type: String,
    /// Enumerated choices; when present the field renders as a choice list
    pub values: Option<Vec<Value>>,
    /// Declared default value
    pub defaults: Value,
    /// Filter values under which this leaf is visible (empty = always)
    pub sub_type: BTreeSet<String>,
    /// Default value per filter value
    pub sub_type_defaults: BTreeMap<String, Value>,
    /// Fixed array index overriding the inherited detail index
    pub data_index: Option<usize>,
    /// Renderer-specific extra options
    pub custom: Option<Value>,
    /// Renderer attributes
    pub attributes: Vec<Value>,
}

impl LeafNode {
    /// Create a string leaf editing the given option path
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            pid: id.clone(),
            id,
            data_type: "string".to_string(),
            values: None,
            defaults: Value::Null,
            sub_type: BTreeSet::new(),
            sub_type_defaults: BTreeMap::new(),
            data_index: None,
            custom: None,
            attributes: Vec::new(),
        }
    }

    /// Set the dictionary key for title and tooltip
    #[must_use]
    pub fn with_pid(mut self, pid: impl Into<String>) -> Self {
        self.pid = pid.into();
        self
    }

    /// Set the field type
    #[must_use]
    pub fn with_data_type(mut self, data_type: impl Into<String>) -> Self {
        self.data_type = data_type.into();
        self
    }

    /// Set the enumerated choices
    #[must_use]
    pub fn with_values(mut self, values: Vec<Value>) -> Self {
        self.values = Some(values);
        self
    }

    /// Set the declared default
    #[must_use]
    pub fn with_defaults(mut self, defaults: Value) -> Self {
        self.defaults = defaults;
        self
    }

    /// Restrict the leaf to the given filter values
    #[must_use]
    pub fn with_sub_type<I, S>(mut self, sub_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sub_type = sub_types.into_iter().map(Into::into).collect();
        self
    }

    /// Add a default used while the given filter value is active
    #[must_use]
    pub fn with_sub_type_default(mut self, filter: impl Into<String>, value: Value) -> Self {
        self.sub_type_defaults.insert(filter.into(), value);
        self
    }

    /// Pin the leaf to an array index
    #[must_use]
    pub fn with_data_index(mut self, index: usize) -> Self {
        self.data_index = Some(index);
        self
    }

    /// Field kind handed to the renderer
    #[must_use]
    pub fn kind(&self) -> &str {
        if self.values.is_some() {
            "options"
        } else {
            &self.data_type
        }
    }

    /// Whether the leaf is visible while `filter` is active
    #[must_use]
    pub fn admits_filter(&self, filter: Option<&str>) -> bool {
        match filter {
            Some(filter) if !self.sub_type.is_empty() => self.sub_type.contains(filter),
            _ => true,
        }
    }

    /// Resolve the value to display.
    ///
    /// Precedence: the value in `options`, then the sub-type default for the
    /// active filter, then the declared default.
    #[must_use]
    pub fn resolve_value(&self, options: &OptionsState, detail_index: Option<usize>, filter: Option<&str>) -> Value {
        if let Some(current) = options.get(&self.id, detail_index) {
            if !current.is_null() {
                return current.clone();
            }
        }

        filter
            .and_then(|f| self.sub_type_defaults.get(f))
            .unwrap_or(&self.defaults)
            .clone()
    }
}

impl GroupNode {
    /// Create a group from its children
    #[must_use]
    pub fn new(children: Vec<MetadataNode>) -> Self {
        Self {
            children,
            ..Self::default()
        }
    }

    /// Set the heading
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Gate the children on the value at `path`
    #[must_use]
    pub fn with_filtered_by(mut self, path: impl Into<String>) -> Self {
        self.filtered_by = Some(path.into());
        self
    }

    /// Add a master selector
    #[must_use]
    pub fn with_controlled_by(mut self, controlled_by: ControlledBy) -> Self {
        self.controlled_by = Some(controlled_by);
        self
    }
}

impl ControlledBy {
    /// Candidates read from the options state
    #[must_use]
    pub fn path(path: impl Into<String>) -> Self {
        Self {
            source: CandidateSource::Path(path.into()),
            options_title: None,
        }
    }

    /// Candidates declared inline
    #[must_use]
    pub fn inline(values: Vec<Value>) -> Self {
        Self {
            source: CandidateSource::Inline(values),
            options_title: None,
        }
    }

    /// Label each candidate by one of its fields
    #[must_use]
    pub fn with_options_title(mut self, field: impl Into<String>) -> Self {
        self.options_title = Some(field.into());
        self
    }

    /// Resolve the candidate list.
    ///
    /// A path that is missing or does not hold a list resolves to no
    /// candidates.
    #[must_use]
    pub fn candidates(&self, options: &OptionsState, detail_index: Option<usize>) -> Vec<Value> {
        match &self.source {
            CandidateSource::Inline(values) => values.clone(),
            CandidateSource::Path(path) => match options.get(path, detail_index) {
                Some(Value::Array(items)) => items.clone(),
                _ => Vec::new(),
            },
        }
    }

    /// Display label for a candidate
    #[must_use]
    pub fn label(&self, candidate: &Value) -> String {
        let shown = match &self.options_title {
            Some(field) => candidate.get(field).unwrap_or(&Value::Null),
            None => candidate,
        };
        match shown {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

impl MetadataNode {
    /// Parse a node from a JSON value, returning `None` for malformed nodes
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        RawNode::deserialize(value).ok().and_then(Self::from_raw)
    }

    /// Shorthand for a leaf node
    #[must_use]
    pub fn leaf(leaf: LeafNode) -> Self {
        Self::Leaf(leaf)
    }

    /// Shorthand for a group node
    #[must_use]
    pub fn group(group: GroupNode) -> Self {
        Self::Group(group)
    }

    /// Whether this node is a group
    #[must_use]
    pub fn is_group(&self) -> bool {
        matches!(self, Self::Group(_))
    }

    /// The leaf, if this node is one
    #[must_use]
    pub fn as_leaf(&self) -> Option<&LeafNode> {
        match self {
            Self::Leaf(leaf) => Some(leaf),
            Self::Group(_) => None,
        }
    }

    /// The group, if this node is one
    #[must_use]
    pub fn as_group(&self) -> Option<&GroupNode> {
        match self {
            Self::Group(group) => Some(group),
            Self::Leaf(_) => None,
        }
    }

    /// Ids of every leaf below (or at) this node, in tree order
    #[must_use]
    pub fn leaf_ids(&self) -> Vec<&str> {
        let mut ids = Vec::new();
        self.collect_leaf_ids(&mut ids);
        ids
    }

    fn collect_leaf_ids<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Leaf(leaf) => out.push(&leaf.id),
            Self::Group(group) => {
                for child in &group.children {
                    child.collect_leaf_ids(out);
                }
            }
        }
    }

    fn from_raw(raw: RawNode) -> Option<Self> {
        if let Some(children) = raw.options {
            return Some(Self::Group(GroupNode {
                text: raw.text,
                children: children.into_iter().filter_map(Self::from_raw).collect(),
                controlled_by: raw.controlled_by.and_then(RawControlledBy::resolve),
                filtered_by: raw.filtered_by,
            }));
        }

        let Some(id) = raw.id else {
            tracing::trace!(text = ?raw.text, "dropping metadata node without options or id");
            return None;
        };

        Some(Self::Leaf(LeafNode {
            pid: raw.pid.unwrap_or_else(|| id.clone()),
            id,
            data_type: raw.data_type.unwrap_or_else(|| "string".to_string()),
            values: raw.values,
            defaults: raw.defaults,
            sub_type: raw.sub_type,
            sub_type_defaults: raw.sub_type_defaults,
            data_index: raw.data_index,
            custom: raw.custom,
            attributes: raw.attributes,
        }))
    }
}

impl<'de> Deserialize<'de> for MetadataNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawNode::deserialize(deserializer)?;
        Self::from_raw(raw).ok_or_else(|| serde::de::Error::custom("metadata node has neither `options` nor `id`"))
    }
}

/// Deserialize a node list, silently dropping malformed entries
pub(crate) fn deserialize_nodes<'de, D>(deserializer: D) -> Result<Vec<MetadataNode>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<RawNode>::deserialize(deserializer)?;
    Ok(raw.into_iter().filter_map(MetadataNode::from_raw).collect())
}

/// Sub-type sets come either as a list or as an object of flags
#[derive(Deserialize)]
#[serde(untagged)]
enum RawSubType {
    List(Vec<String>),
    Flags(BTreeMap<String, Value>),
    Single(String),
}

/// Deserialize a sub-type set from any of its on-disk shapes
pub(crate) fn deserialize_sub_type<'de, D>(deserializer: D) -> Result<BTreeSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<RawSubType>::deserialize(deserializer)? {
        None => BTreeSet::new(),
        Some(RawSubType::List(items)) => items.into_iter().collect(),
        Some(RawSubType::Flags(flags)) => flags
            .into_iter()
            .filter(|(_, on)| !matches!(on, Value::Null | Value::Bool(false)))
            .map(|(key, _)| key)
            .collect(),
        Some(RawSubType::Single(item)) => std::iter::once(item).collect(),
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNode {
    #[serde(default)]
    options: Option<Vec<RawNode>>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    pid: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    data_type: Option<String>,
    #[serde(default)]
    values: Option<Vec<Value>>,
    #[serde(default)]
    defaults: Value,
    #[serde(default, deserialize_with = "deserialize_sub_type")]
    sub_type: BTreeSet<String>,
    #[serde(default)]
    sub_type_defaults: BTreeMap<String, Value>,
    #[serde(default)]
    data_index: Option<usize>,
    #[serde(default)]
    custom: Option<Value>,
    #[serde(default)]
    attributes: Vec<Value>,
    #[serde(default)]
    controlled_by: Option<RawControlledBy>,
    #[serde(default)]
    filtered_by: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawControlledBy {
    #[serde(default)]
    options: Value,
    #[serde(default)]
    options_title: Option<String>,
}

impl RawControlledBy {
    fn resolve(self) -> Option<ControlledBy> {
        let source = match self.options {
            Value::String(path) => CandidateSource::Path(path),
            Value::Array(values) => CandidateSource::Inline(values),
            other => {
                tracing::trace!(options = %other, "ignoring master selector without a candidate source");
                return None;
            }
        };
        Some(ControlledBy {
            source,
            options_title: self.options_title,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_group_vs_leaf_discrimination() {
        let group = MetadataNode::from_value(json!({"text": "Title", "options": [{"id": "title--text"}]})).unwrap();
        assert!(group.is_group());
        assert_eq!(group.leaf_ids(), vec!["title--text"]);

        let leaf = MetadataNode::from_value(json!({"id": "chart--type", "dataType": "string"})).unwrap();
        assert_eq!(leaf.as_leaf().unwrap().id, "chart--type");
    }

    #[test]
    fn test_malformed_children_are_dropped() {
        let group = MetadataNode::from_value(json!({
            "options": [{"text": "orphan"}, {"id": "a"}, {}]
        }))
        .unwrap();
        assert_eq!(group.as_group().unwrap().children.len(), 1);
        assert!(MetadataNode::from_value(json!({"text": "nothing"})).is_none());
    }

    #[test]
    fn test_leaf_fields_parsed() {
        let node = MetadataNode::from_value(json!({
            "id": "series--marker--enabled",
            "pid": "series.marker.enabled",
            "dataType": "boolean",
            "defaults": true,
            "subType": ["line", "spline"],
            "subTypeDefaults": {"line": false},
            "dataIndex": 1
        }))
        .unwrap();
        let leaf = node.as_leaf().unwrap();
        assert_eq!(leaf.pid, "series.marker.enabled");
        assert_eq!(leaf.kind(), "boolean");
        assert_eq!(leaf.defaults, json!(true));
        assert!(leaf.sub_type.contains("spline"));
        assert_eq!(leaf.sub_type_defaults.get("line"), Some(&json!(false)));
        assert_eq!(leaf.data_index, Some(1));
    }

    #[test]
    fn test_sub_type_flag_object() {
        let node = MetadataNode::from_value(json!({
            "id": "x",
            "subType": {"line": true, "bar": false, "area": 1}
        }))
        .unwrap();
        let sub_type = &node.as_leaf().unwrap().sub_type;
        assert!(sub_type.contains("line"));
        assert!(sub_type.contains("area"));
        assert!(!sub_type.contains("bar"));
    }

    #[test]
    fn test_values_make_options_kind() {
        let leaf = LeafNode::new("chart--type")
            .with_data_type("string")
            .with_values(vec![json!("line"), json!("bar")]);
        assert_eq!(leaf.kind(), "options");
    }

    #[test]
    fn test_admits_filter() {
        let leaf = LeafNode::new("a").with_sub_type(["line"]);
        assert!(leaf.admits_filter(None));
        assert!(leaf.admits_filter(Some("line")));
        assert!(!leaf.admits_filter(Some("bar")));

        let unrestricted = LeafNode::new("b");
        assert!(unrestricted.admits_filter(Some("bar")));
    }

    #[test]
    fn test_value_precedence() {
        let leaf = LeafNode::new("series--lineWidth")
            .with_defaults(json!(2))
            .with_sub_type_default("spline", json!(3));

        let empty = OptionsState::default();
        assert_eq!(leaf.resolve_value(&empty, None, None), json!(2));
        assert_eq!(leaf.resolve_value(&empty, None, Some("spline")), json!(3));
        assert_eq!(leaf.resolve_value(&empty, None, Some("bar")), json!(2));

        let set = OptionsState::new(json!({"series": [{"lineWidth": 7}]}));
        assert_eq!(leaf.resolve_value(&set, Some(0), Some("spline")), json!(7));
    }

    #[test]
    fn test_controlled_by_parsing() {
        let node = MetadataNode::from_value(json!({
            "options": [],
            "controlledBy": {"options": "series", "optionsTitle": "name"}
        }))
        .unwrap();
        let controlled = node.as_group().unwrap().controlled_by.clone().unwrap();
        assert_eq!(controlled.source, CandidateSource::Path("series".to_string()));
        assert_eq!(controlled.options_title.as_deref(), Some("name"));

        let no_source = MetadataNode::from_value(json!({"options": [], "controlledBy": {"options": 3}})).unwrap();
        assert!(no_source.as_group().unwrap().controlled_by.is_none());
    }

    #[test]
    fn test_candidates_and_labels() {
        let options = OptionsState::new(json!({"series": [{"name": "Tokyo"}, {"name": "Oslo"}]}));
        let controlled = ControlledBy::path("series").with_options_title("name");
        let candidates = controlled.candidates(&options, None);
        assert_eq!(candidates.len(), 2);
        assert_eq!(controlled.label(&candidates[1]), "Oslo");

        let missing = ControlledBy::path("yAxis");
        assert!(missing.candidates(&options, None).is_empty());

        let inline = ControlledBy::inline(vec![json!(1), json!("two")]);
        assert_eq!(inline.label(&json!(1)), "1");
        assert_eq!(inline.candidates(&options, None).len(), 2);
    }
}
