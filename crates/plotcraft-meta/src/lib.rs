//! plotcraft metadata - the static side of the chart editor
//!
//! This crate holds everything the editor widgets read but never change:
//! the option schema tree that drives the property form, the advanced
//! option tree, the chart template catalog and the localization
//! dictionary. It also provides [`OptionsState`], the live chart options
//! the widgets read values from and write edits into.
//!
//! # Core Types
//!
//! - [`MetadataNode`]: a group of nodes or a single editable leaf
//! - [`OptionsCatalog`]: ordered categories of metadata groups
//! - [`AdvancedTree`]: the full option tree for the advanced view
//! - [`TemplateCatalog`]: chart templates grouped for the template picker
//! - [`AllowList`]: optional whitelist of exposed leaf ids
//! - [`OptionsState`]: path-addressed chart options with change tracking

use std::path::Path;

use serde::de::DeserializeOwned;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error types for metadata loading
pub mod error;

/// Metadata tree nodes
pub mod node;

/// Category catalog for the simple view
pub mod catalog;

/// Option tree for the advanced view
pub mod advanced;

/// Chart template catalog
pub mod template;

/// Live chart options
pub mod options;

/// Allow-list filtering
pub mod filter;

/// Localized strings
pub mod i18n;

pub use advanced::{AdvancedEntry, AdvancedNode, AdvancedTree};
pub use catalog::{Category, OptionsCatalog};
pub use error::{MetaError, MetaResult};
pub use filter::AllowList;
pub use i18n::{uncamelize, Dictionary};
pub use node::{CandidateSource, ControlledBy, GroupNode, LeafNode, MetadataNode};
pub use options::OptionsState;
pub use template::{ChartTemplate, TemplateCatalog, TemplateGroup};

/// Read and deserialize a JSON document from disk
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> MetaResult<T> {
    let content = std::fs::read_to_string(path).map_err(|source| MetaError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), bytes = content.len(), "loading metadata document");
    Ok(serde_json::from_str(&content)?)
}
