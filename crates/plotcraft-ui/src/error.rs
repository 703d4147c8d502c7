//! Error types for the plotcraft widgets

use thiserror::Error;

use crate::field::FieldHandle;
use crate::surface::SlotId;

/// Widget errors
#[derive(Debug, Error)]
pub enum UiError {
    /// No category with this id is listed
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    /// No advanced-tree item with this id (and index) is shown
    #[error("Unknown advanced option node: {0}")]
    UnknownAdvancedNode(String),

    /// The field handle does not belong to a rendered control
    #[error("Unknown or stale field handle: {0}")]
    UnknownField(FieldHandle),

    /// No rendered group occupies this slot
    #[error("No group rendered at slot {0}")]
    UnknownSlot(SlotId),

    /// The rendered group has no master selector, or the index is out of range
    #[error("Invalid master selection {index} for slot {slot}")]
    InvalidSelection { slot: SlotId, index: usize },

    /// No template group with this id
    #[error("Unknown template group: {0}")]
    UnknownTemplateGroup(String),

    /// No template with this key in the shown group
    #[error("Unknown template: {0}")]
    UnknownTemplate(String),

    /// Configuration could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for widget operations
pub type UiResult<T> = Result<T, UiError>;
