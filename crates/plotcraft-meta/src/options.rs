//! Live chart options
//!
//! [`OptionsState`] wraps the chart options as a JSON value and addresses
//! them by option path. A path is a list of keys separated by `--` or `.`
//! (`series--type`, `xAxis.title.text`). Array-valued options are indexed
//! implicitly: when a lookup past the first key meets an array, the
//! element at the supplied index (or 0) is used.

use std::collections::HashSet;

use serde_json::{Map, Value};

/// Path-addressed chart options with change tracking
#[derive(Debug, Clone, Default)]
pub struct OptionsState {
    /// The options document
    value: Value,
    /// Generation counter for change detection
    generation: u64,
    /// Paths written since the last clear
    dirty_paths: HashSet<String>,
}

/// Split an option path into its keys
#[must_use]
pub fn path_segments(path: &str) -> Vec<&str> {
    path.split("--")
        .flat_map(|part| part.split('.'))
        .filter(|segment| !segment.is_empty())
        .collect()
}

impl OptionsState {
    /// Create a state from an options document
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self {
            value,
            generation: 0,
            dirty_paths: HashSet::new(),
        }
    }

    /// The whole options document
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Consume the state and return the document
    #[must_use]
    pub fn into_value(self) -> Value {
        self.value
    }

    /// Replace the whole document
    pub fn replace(&mut self, value: Value) {
        self.value = value;
        self.generation += 1;
        self.dirty_paths.insert("*".to_string());
    }

    /// Current generation (for change detection)
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether anything changed since the given generation
    #[must_use]
    pub fn has_changed_since(&self, generation: u64) -> bool {
        self.generation > generation
    }

    /// Read the value at `path`, using `index` for array-valued options
    #[must_use]
    pub fn get(&self, path: &str, index: Option<usize>) -> Option<&Value> {
        let segments = path_segments(path);
        if segments.is_empty() {
            return None;
        }

        let mut current = &self.value;
        for (position, segment) in segments.iter().enumerate() {
            if position > 0 {
                if let Value::Array(items) = current {
                    current = items.get(index.unwrap_or(0))?;
                }
            }
            current = current.get(*segment)?;
        }
        Some(current)
    }

    /// Whether a non-null value is stored at `path`
    #[must_use]
    pub fn contains(&self, path: &str, index: Option<usize>) -> bool {
        self.get(path, index).is_some_and(|v| !v.is_null())
    }

    /// Write `value` at `path`, creating intermediate objects and array
    /// elements as needed. Returns false for an empty path.
    pub fn set(&mut self, path: &str, value: Value, index: Option<usize>) -> bool {
        let segments = path_segments(path);
        let Some((last, parents)) = segments.split_last() else {
            return false;
        };

        let mut current = &mut self.value;
        for (position, segment) in parents.iter().enumerate() {
            if position > 0 {
                current = array_element(current, index);
            }
            current = object_mut(current)
                .entry((*segment).to_string())
                .or_insert_with(|| Value::Object(Map::new()));
        }
        if !parents.is_empty() {
            current = array_element(current, index);
        }
        object_mut(current).insert((*last).to_string(), value);

        self.generation += 1;
        self.dirty_paths.insert(path.to_string());
        true
    }

    /// Whether `path` was written since the last clear
    #[must_use]
    pub fn is_path_dirty(&self, path: &str) -> bool {
        self.dirty_paths.contains(path) || self.dirty_paths.contains("*")
    }

    /// Paths written since the last clear
    #[must_use]
    pub fn dirty_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.dirty_paths.iter().cloned().collect();
        paths.sort();
        paths
    }

    /// Clear all dirty markers
    pub fn clear_dirty(&mut self) {
        self.dirty_paths.clear();
    }
}

/// Step into the indexed element when `value` is an array
fn array_element(value: &mut Value, index: Option<usize>) -> &mut Value {
    match value {
        Value::Array(items) => {
            let index = index.unwrap_or(0);
            if items.len() <= index {
                items.resize_with(index + 1, || Value::Object(Map::new()));
            }
            &mut items[index]
        }
        other => other,
    }
}

/// Borrow `value` as an object, replacing it with an empty one if needed
fn object_mut(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("value was just made an object"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_path_segments() {
        assert_eq!(path_segments("series--type"), vec!["series", "type"]);
        assert_eq!(path_segments("xAxis.title.text"), vec!["xAxis", "title", "text"]);
        assert_eq!(path_segments("plotOptions--series.marker"), vec!["plotOptions", "series", "marker"]);
        assert!(path_segments("").is_empty());
    }

    #[test]
    fn test_get_nested() {
        let state = OptionsState::new(json!({"title": {"text": "Sales"}}));
        assert_eq!(state.get("title--text", None), Some(&json!("Sales")));
        assert_eq!(state.get("title--missing", None), None);
        assert_eq!(state.get("", None), None);
    }

    #[test]
    fn test_get_indexed() {
        let state = OptionsState::new(json!({
            "series": [{"type": "line"}, {"type": "bar"}]
        }));
        assert_eq!(state.get("series--type", None), Some(&json!("line")));
        assert_eq!(state.get("series--type", Some(1)), Some(&json!("bar")));
        assert_eq!(state.get("series--type", Some(5)), None);
        // the top-level array itself is returned whole
        assert_eq!(state.get("series", Some(1)).and_then(Value::as_array).map(Vec::len), Some(2));
    }

    #[test]
    fn test_contains_ignores_null() {
        let state = OptionsState::new(json!({"a": null, "b": 0}));
        assert!(!state.contains("a", None));
        assert!(state.contains("b", None));
    }

    #[test]
    fn test_set_creates_intermediates() {
        let mut state = OptionsState::default();
        assert!(state.set("xAxis--title--text", json!("Year"), None));
        assert_eq!(state.value(), &json!({"xAxis": {"title": {"text": "Year"}}}));
    }

    #[test]
    fn test_set_indexed_extends_array() {
        let mut state = OptionsState::new(json!({"series": [{"type": "line"}]}));
        state.set("series--type", json!("bar"), Some(2));
        assert_eq!(state.get("series--type", Some(0)), Some(&json!("line")));
        assert_eq!(state.get("series--type", Some(2)), Some(&json!("bar")));
        assert_eq!(state.value()["series"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_set_empty_path() {
        let mut state = OptionsState::default();
        assert!(!state.set("", json!(1), None));
        assert_eq!(state.generation(), 0);
    }

    #[test]
    fn test_generation_and_dirty() {
        let mut state = OptionsState::default();
        let start = state.generation();
        state.set("chart--type", json!("area"), None);
        assert!(state.has_changed_since(start));
        assert!(state.is_path_dirty("chart--type"));
        assert!(!state.is_path_dirty("title--text"));
        assert_eq!(state.dirty_paths(), vec!["chart--type".to_string()]);

        state.clear_dirty();
        assert!(!state.is_path_dirty("chart--type"));

        state.replace(json!({}));
        assert!(state.is_path_dirty("anything"));
    }
}
