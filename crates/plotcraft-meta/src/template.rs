//! Chart template catalog
//!
//! Templates are preset chart configurations grouped by chart family
//! (Line, Area, Column, ...). The template picker lists the groups and
//! shows one preview per template.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::MetaResult;

/// Chart constructor that requires the stock-chart module
pub const STOCK_CONSTRUCTOR: &str = "StockChart";

/// A preset chart configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartTemplate {
    /// Key within its group
    pub key: String,
    /// Display title
    pub title: String,
    /// Preview image
    #[serde(default)]
    pub url_img: Option<String>,
    /// Hint shown while hovering the preview
    #[serde(default)]
    pub tooltip_text: Option<String>,
    /// Chart constructor (`Chart`, `StockChart`, ...)
    #[serde(default)]
    pub constr: Option<String>,
    /// Options merged into the chart when the template is applied
    #[serde(default)]
    pub config: Value,
}

/// A family of templates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateGroup {
    /// Group id
    pub id: String,
    /// Display title
    pub title: String,
    /// Templates in display order
    #[serde(default)]
    pub templates: Vec<ChartTemplate>,
}

/// All template groups
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateCatalog {
    #[serde(default)]
    groups: Vec<TemplateGroup>,
}

impl ChartTemplate {
    /// Create a template
    #[must_use]
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            url_img: None,
            tooltip_text: None,
            constr: None,
            config: Value::Null,
        }
    }

    /// Set the hover hint
    #[must_use]
    pub fn with_tooltip(mut self, text: impl Into<String>) -> Self {
        self.tooltip_text = Some(text.into());
        self
    }

    /// Set the chart constructor
    #[must_use]
    pub fn with_constr(mut self, constr: impl Into<String>) -> Self {
        self.constr = Some(constr.into());
        self
    }

    /// Whether the template needs the stock-chart module
    #[must_use]
    pub fn requires_stock(&self) -> bool {
        self.constr.as_deref() == Some(STOCK_CONSTRUCTOR)
    }
}

impl TemplateGroup {
    /// Create a group
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>, templates: Vec<ChartTemplate>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            templates,
        }
    }

    /// Look up a template by key
    #[must_use]
    pub fn template(&self, key: &str) -> Option<&ChartTemplate> {
        self.templates.iter().find(|t| t.key == key)
    }
}

impl TemplateCatalog {
    /// Build a catalog from groups
    #[must_use]
    pub fn new(groups: Vec<TemplateGroup>) -> Self {
        Self { groups }
    }

    /// Parse a catalog from a JSON string
    pub fn from_json_str(json: &str) -> MetaResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a catalog from a JSON file
    pub fn from_path(path: &Path) -> MetaResult<Self> {
        crate::read_json(path)
    }

    /// All groups in order
    #[must_use]
    pub fn groups(&self) -> &[TemplateGroup] {
        &self.groups
    }

    /// Look up a group by id
    #[must_use]
    pub fn group(&self, id: &str) -> Option<&TemplateGroup> {
        self.groups.iter().find(|g| g.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_catalog() {
        let catalog = TemplateCatalog::from_json_str(
            r#"{"groups": [
                {"id": "line", "title": "Line charts", "templates": [
                    {"key": "basic", "title": "Line chart", "urlImg": "line.svg", "config": {"chart": {"type": "line"}}},
                    {"key": "stock", "title": "Stock line", "constr": "StockChart"}
                ]}
            ]}"#,
        )
        .unwrap();

        let line = catalog.group("line").unwrap();
        assert_eq!(line.templates.len(), 2);
        assert_eq!(line.template("basic").unwrap().url_img.as_deref(), Some("line.svg"));
        assert!(line.template("stock").unwrap().requires_stock());
        assert!(!line.template("basic").unwrap().requires_stock());
        assert!(catalog.group("pie").is_none());
    }
}
