//! plotcraft widgets - chart options editor and template picker
//!
//! This crate turns the metadata from `plotcraft-meta` into editable
//! forms. It does not draw anything itself: widgets render into a retained
//! [`Panel`] of groups, master selectors, placeholders and field controls
//! that a toolkit front end walks to draw, and they receive user input
//! back as commits addressed by [`FieldHandle`].
//!
//! # Core Components
//!
//! - [`ChartCustomizer`]: category list + filter-aware form, plus the
//!   advanced option tree
//! - [`ChartTemplateSelector`]: grouped chart template previews
//! - [`FormBuilder`]: the recursive metadata renderer both views share
//! - [`FieldRenderer`]: the seam where hosts plug in their own controls
//! - [`EventEmitter`]: typed listener registry each widget publishes on
//! - [`EditorConfig`]: TOML-backed widget settings
//!
//! Everything is single-threaded. Widgets are plain owned values; share
//! them with `Rc<RefCell<_>>` if several host components need access.

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error types for widget operations
pub mod error;

/// Typed event emitters and widget messages
pub mod events;

/// Retained render surface
pub mod surface;

/// Field renderer seam
pub mod field;

/// Recursive form builder and commit bindings
pub mod form;

/// Category list and option tree models
pub mod selection;

/// Advanced view rendering
pub mod routing;

/// Timed field emphasis
pub mod highlight;

/// Chart customizer widget
pub mod customizer;

/// Chart template picker widget
pub mod template_selector;

/// Editor configuration
pub mod config;

// Re-exports for convenience
pub use config::{CustomizerConfig, EditorConfig, TemplateSelectorConfig};
pub use customizer::{ChartCustomizer, CustomizerSources, FocusTarget};
pub use error::{UiError, UiResult};
pub use events::{EventEmitter, ListenerId, PropertyChange, TemplateEvent};
pub use field::{ControlKind, FieldControl, FieldHandle, FieldOptions, FieldRenderer, FieldRequest, InspectorField};
pub use form::{Binding, BindingRegistry, FilterContext, FormBuilder};
pub use highlight::{Emphasis, Highlighter, DEFAULT_HIGHLIGHT};
pub use routing::AdvancedSelection;
pub use selection::{ListItem, OptionsTree, SelectionList, TreeEvent, TreeItem};
pub use surface::{Element, GroupElement, MasterSelector, Panel, SlotId, View, NO_DATA_MESSAGE};
pub use template_selector::{ChartTemplateSelector, SelectedTemplate, TemplatePreview};
