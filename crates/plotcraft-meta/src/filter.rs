//! Allow-list filtering
//!
//! An [`AllowList`] restricts the editor to a whitelist of leaf ids. An
//! empty list allows everything. Groups are kept only while at least one
//! leaf below them is allowed, so whole sections disappear when none of
//! their properties are exposed.

use std::collections::BTreeSet;

use crate::node::MetadataNode;

/// Optional whitelist of exposed leaf ids
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowList {
    ids: BTreeSet<String>,
}

impl AllowList {
    /// An allow-list that admits everything
    #[must_use]
    pub fn open() -> Self {
        Self::default()
    }

    /// Whether no restriction is in place
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Number of whitelisted ids
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether a leaf id may be rendered
    #[must_use]
    pub fn admits(&self, id: &str) -> bool {
        self.ids.is_empty() || self.ids.contains(id)
    }

    /// Whether a node should be rendered at all
    #[must_use]
    pub fn should_include(&self, node: &MetadataNode) -> bool {
        if self.ids.is_empty() {
            return true;
        }
        match node {
            MetadataNode::Leaf(leaf) => self.ids.contains(&leaf.id),
            MetadataNode::Group(group) => group.children.iter().any(|child| self.should_include(child)),
        }
    }

    /// Whether any of the given nodes should be rendered
    #[must_use]
    pub fn should_include_any(&self, nodes: &[MetadataNode]) -> bool {
        self.ids.is_empty() || nodes.iter().any(|node| self.should_include(node))
    }
}

impl<S: Into<String>> FromIterator<S> for AllowList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{GroupNode, LeafNode};

    fn group(ids: &[&str]) -> MetadataNode {
        MetadataNode::group(GroupNode::new(
            ids.iter().map(|id| MetadataNode::leaf(LeafNode::new(*id))).collect(),
        ))
    }

    #[test]
    fn test_empty_list_includes_everything() {
        let allow = AllowList::open();
        assert!(allow.should_include(&group(&["a"])));
        assert!(allow.should_include(&group(&[])));
        assert!(allow.admits("anything"));
    }

    #[test]
    fn test_group_included_iff_descendant_allowed() {
        let allow: AllowList = ["b"].into_iter().collect();
        assert!(allow.should_include(&group(&["a", "b"])));
        assert!(!allow.should_include(&group(&["a", "c"])));
        assert!(!allow.should_include(&group(&[])));
    }

    #[test]
    fn test_nested_groups() {
        let allow: AllowList = ["deep"].into_iter().collect();
        let nested = MetadataNode::group(GroupNode::new(vec![
            group(&["shallow"]),
            MetadataNode::group(GroupNode::new(vec![group(&["deep"])])),
        ]));
        assert!(allow.should_include(&nested));
        assert!(!allow.should_include(&group(&["shallow"])));
    }

    #[test]
    fn test_include_any() {
        let allow: AllowList = ["x"].into_iter().collect();
        assert!(allow.should_include_any(&[group(&["a"]), group(&["x"])]));
        assert!(!allow.should_include_any(&[group(&["a"])]));
        assert!(AllowList::open().should_include_any(&[]));
    }
}
