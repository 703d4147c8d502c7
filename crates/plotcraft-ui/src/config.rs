//! Editor configuration
//!
//! Stores the widget settings hosts usually want to keep between
//! sessions: which views are shown, the exposed option allow-list, the
//! highlight duration and per-node discriminator overrides.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{UiError, UiResult};

/// Default highlight duration in milliseconds
const DEFAULT_HIGHLIGHT_MS: u64 = 2000;

/// Settings for the chart customizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomizerConfig {
    /// Hide the advanced view
    pub no_advanced: bool,
    /// Compact layout, which also hides the advanced view
    pub compact: bool,
    /// Exposed leaf ids; empty exposes everything
    pub available_settings: Vec<String>,
    /// How long a highlighted field stays emphasized
    pub highlight_ms: u64,
    /// Advanced node id to discriminator entry id
    pub discriminators: HashMap<String, String>,
}

impl Default for CustomizerConfig {
    fn default() -> Self {
        Self {
            no_advanced: false,
            compact: false,
            available_settings: Vec::new(),
            highlight_ms: DEFAULT_HIGHLIGHT_MS,
            discriminators: HashMap::new(),
        }
    }
}

impl CustomizerConfig {
    /// Highlight duration
    #[must_use]
    pub fn highlight_duration(&self) -> Duration {
        Duration::from_millis(self.highlight_ms)
    }
}

/// Settings for the template picker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateSelectorConfig {
    /// Whether stock chart templates can be offered
    pub stock_available: bool,
}

impl Default for TemplateSelectorConfig {
    fn default() -> Self {
        Self { stock_available: true }
    }
}

/// Main editor configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub customizer: CustomizerConfig,
    pub templates: TemplateSelectorConfig,
}

impl EditorConfig {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("plotcraft").join("editor.toml"))
    }

    /// Load configuration from the default location, falling back to
    /// defaults when it is missing or unreadable
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "ignoring unreadable editor config");
                Self::default()
            }),
            _ => Self::default(),
        }
    }

    /// Load configuration from `path`
    pub fn load_from(path: &Path) -> UiResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| UiError::Config(format!("cannot read {}: {e}", path.display())))?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded editor config");
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> UiResult<Self> {
        toml::from_str(content).map_err(|e| UiError::Config(e.to_string()))
    }

    /// Save configuration to the default location
    pub fn save(&self) -> UiResult<()> {
        let path = Self::config_path().ok_or_else(|| UiError::Config("config directory not found".to_string()))?;
        self.save_to(&path)
    }

    /// Save configuration to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> UiResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| UiError::Config(format!("cannot create {}: {e}", parent.display())))?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| UiError::Config(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| UiError::Config(format!("cannot write {}: {e}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EditorConfig::default();
        assert!(!config.customizer.no_advanced);
        assert!(config.customizer.available_settings.is_empty());
        assert_eq!(config.customizer.highlight_duration(), Duration::from_secs(2));
        assert!(config.templates.stock_available);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EditorConfig::from_toml_str(
            r#"
            [customizer]
            compact = true
            available_settings = ["title--text"]

            [customizer.discriminators]
            series = "series--type"
            "#,
        )
        .unwrap();

        assert!(config.customizer.compact);
        assert_eq!(config.customizer.available_settings, vec!["title--text"]);
        assert_eq!(config.customizer.highlight_ms, 2000);
        assert_eq!(config.customizer.discriminators["series"], "series--type");
        assert!(config.templates.stock_available);
    }

    #[test]
    fn test_invalid_toml() {
        let err = EditorConfig::from_toml_str("[customizer]\nhighlight_ms = \"soon\"").unwrap_err();
        assert!(matches!(err, UiError::Config(_)));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("editor.toml");

        let mut config = EditorConfig::default();
        config.customizer.highlight_ms = 500;
        config.templates.stock_available = false;
        config.save_to(&path).unwrap();

        assert_eq!(EditorConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = EditorConfig::load_from(&dir.path().join("absent.toml")).unwrap_err();
        assert!(err.to_string().contains("absent.toml"));
    }
}
