//! Localized strings

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::MetaResult;

/// Flat key → text dictionary. Unknown keys translate to themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Dictionary {
    entries: HashMap<String, String>,
}

impl Dictionary {
    /// Create an empty dictionary
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a dictionary from a JSON object of strings
    pub fn from_json_str(json: &str) -> MetaResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a dictionary from a JSON file
    pub fn from_path(path: &Path) -> MetaResult<Self> {
        crate::read_json(path)
    }

    /// Add or replace an entry
    pub fn insert(&mut self, key: impl Into<String>, text: impl Into<String>) {
        self.entries.insert(key.into(), text.into());
    }

    /// Translate a key
    #[must_use]
    pub fn lookup(&self, key: &str) -> String {
        self.entries.get(key).cloned().unwrap_or_else(|| key.to_string())
    }

    /// Title of an option leaf
    #[must_use]
    pub fn option_title(&self, pid: &str) -> String {
        self.lookup(&format!("option.text.{pid}"))
    }

    /// Tooltip of an option leaf
    #[must_use]
    pub fn option_tooltip(&self, pid: &str) -> String {
        self.lookup(&format!("option.tooltip.{pid}"))
    }
}

/// Turn a camelCase name into spaced title case (`lineWidth` → `Line Width`)
#[must_use]
pub fn uncamelize(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if i == 0 {
            out.extend(ch.to_uppercase());
        } else if ch.is_uppercase() {
            out.push(' ');
            out.push(ch);
        } else {
            out.push(ch);
        }
    }
    out
}
