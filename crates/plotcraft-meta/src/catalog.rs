//! Category catalog for the simple view
//!
//! The simple customizer view lists categories (Chart, Title, Axes, ...);
//! selecting one renders each of its metadata groups.

use std::path::Path;

use serde::Deserialize;

use crate::error::MetaResult;
use crate::node::{deserialize_nodes, MetadataNode};

/// One entry of the category list
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Category {
    /// Category id (also the dictionary key for its title)
    pub id: String,
    /// Explicit title; the localized id is used when absent
    #[serde(default)]
    pub title: Option<String>,
    /// Metadata groups rendered when the category is selected
    #[serde(default, deserialize_with = "deserialize_nodes")]
    pub groups: Vec<MetadataNode>,
}

/// Ordered categories of metadata groups
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OptionsCatalog {
    #[serde(default)]
    categories: Vec<Category>,
}

impl OptionsCatalog {
    /// Build a catalog from categories
    #[must_use]
    pub fn new(categories: Vec<Category>) -> Self {
        Self { categories }
    }

    /// Parse a catalog from a JSON string
    pub fn from_json_str(json: &str) -> MetaResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a catalog from a JSON file
    pub fn from_path(path: &Path) -> MetaResult<Self> {
        crate::read_json(path)
    }

    /// All categories in order
    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Look up a category by id
    #[must_use]
    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// Number of categories
    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Whether the catalog has no categories
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

impl Category {
    /// Create a category
    #[must_use]
    pub fn new(id: impl Into<String>, groups: Vec<MetadataNode>) -> Self {
        Self {
            id: id.into(),
            title: None,
            groups,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"{
        "categories": [
            {"id": "chart", "groups": [
                {"text": "chart.general", "options": [{"id": "chart--type"}, {"id": "chart--width", "dataType": "number"}]}
            ]},
            {"id": "title", "title": "Titles", "groups": [
                {"text": "title.main", "options": [{"id": "title--text"}]},
                {"text": "broken"}
            ]}
        ]
    }"#;

    #[test]
    fn test_parse_catalog() {
        let catalog = OptionsCatalog::from_json_str(CATALOG).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.categories()[0].id, "chart");
        assert_eq!(catalog.category("title").unwrap().title.as_deref(), Some("Titles"));
    }

    #[test]
    fn test_malformed_groups_skipped() {
        let catalog = OptionsCatalog::from_json_str(CATALOG).unwrap();
        assert_eq!(catalog.category("title").unwrap().groups.len(), 1);
    }

    #[test]
    fn test_missing_category() {
        let catalog = OptionsCatalog::from_json_str(CATALOG).unwrap();
        assert!(catalog.category("legend").is_none());
    }

    #[test]
    fn test_invalid_json() {
        assert!(OptionsCatalog::from_json_str("{").is_err());
    }
}
