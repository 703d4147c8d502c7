//! Field rendering
//!
//! A [`FieldRenderer`] turns one editable property into a control
//! description. The form builder hands it the field kind, the resolved
//! value, an options bundle and a [`FieldHandle`]; the host reports user
//! commits back to the owning widget by that handle, exactly once per
//! commit.

use std::fmt;

use serde_json::Value;

/// Identifier linking a rendered control back to its binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldHandle(u64);

impl FieldHandle {
    /// Create a handle from a raw value
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw handle value
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for FieldHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Presentation bundle handed to the renderer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldOptions {
    /// Field label
    pub title: String,
    /// Hover help
    pub tooltip: String,
    /// Enumerated choices
    pub values: Option<Vec<Value>>,
    /// Renderer-specific extras
    pub custom: Option<Value>,
    /// Declared default
    pub defaults: Value,
    /// Renderer attributes
    pub attributes: Vec<Value>,
}

impl FieldOptions {
    /// Bundle with just a title
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Input a renderer is asked to produce a control for
#[derive(Debug, Clone)]
pub struct FieldRequest<'a> {
    /// Field kind (`string`, `number`, `boolean`, `color`, `options`, ...)
    pub kind: &'a str,
    /// Value to display
    pub value: Value,
    /// Presentation bundle
    pub options: FieldOptions,
    /// Handle the host reports commits with
    pub handle: FieldHandle,
    /// Option path being edited
    pub field_id: &'a str,
}

/// Concrete input control
#[derive(Debug, Clone, PartialEq)]
pub enum ControlKind {
    /// Free text
    Text,
    /// Numeric input
    Number,
    /// On/off switch
    Toggle,
    /// Color picker
    Color,
    /// Choice from fixed labels
    Choice(Vec<String>),
    /// Structured value edited as JSON
    Json,
}

/// A rendered field control
#[derive(Debug, Clone, PartialEq)]
pub struct FieldControl {
    /// Handle for reporting commits
    pub handle: FieldHandle,
    /// Option path being edited
    pub field_id: String,
    /// Field kind as declared by the metadata
    pub kind: String,
    /// Control chosen by the renderer
    pub control: ControlKind,
    /// Displayed value
    pub value: Value,
    /// Presentation bundle
    pub options: FieldOptions,
}

/// Produces a control for one editable property
pub trait FieldRenderer {
    /// Render a field
    fn render(&self, request: FieldRequest<'_>) -> FieldControl;
}

/// Default renderer mapping field kinds onto the basic control set
#[derive(Debug, Clone, Copy, Default)]
pub struct InspectorField;

impl InspectorField {
    /// Control used for a field kind
    #[must_use]
    pub fn control_for(kind: &str, values: Option<&[Value]>) -> ControlKind {
        match kind {
            "options" => ControlKind::Choice(values.unwrap_or_default().iter().map(choice_label).collect()),
            "number" | "integer" => ControlKind::Number,
            "boolean" | "bool" => ControlKind::Toggle,
            "color" => ControlKind::Color,
            "object" | "cssobject" | "font" => ControlKind::Json,
            kind if kind.starts_with("array") => ControlKind::Json,
            _ => ControlKind::Text,
        }
    }
}

impl FieldRenderer for InspectorField {
    fn render(&self, request: FieldRequest<'_>) -> FieldControl {
        let control = Self::control_for(request.kind, request.options.values.as_deref());
        FieldControl {
            handle: request.handle,
            field_id: request.field_id.to_string(),
            kind: request.kind.to_string(),
            control,
            value: request.value,
            options: request.options,
        }
    }
}

impl ControlKind {
    /// Interpret raw user input for this control.
    ///
    /// Numbers and toggles fall back to text when the input does not parse;
    /// JSON controls fall back to a plain string.
    #[must_use]
    pub fn coerce(&self, input: &str) -> Value {
        let trimmed = input.trim();
        match self {
            Self::Number => trimmed
                .parse::<i64>()
                .map(Value::from)
                .or_else(|_| trimmed.parse::<f64>().map(Value::from))
                .unwrap_or_else(|_| Value::String(input.to_string())),
            Self::Toggle => match trimmed {
                "true" | "on" | "yes" | "1" => Value::Bool(true),
                "false" | "off" | "no" | "0" => Value::Bool(false),
                _ => Value::String(input.to_string()),
            },
            Self::Json => serde_json::from_str(trimmed).unwrap_or_else(|_| Value::String(input.to_string())),
            Self::Text | Self::Color | Self::Choice(_) => Value::String(input.to_string()),
        }
    }
}

fn choice_label(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request<'a>(kind: &'a str, values: Option<Vec<Value>>) -> FieldRequest<'a> {
        FieldRequest {
            kind,
            value: json!(null),
            options: FieldOptions {
                values,
                ..FieldOptions::titled("Type")
            },
            handle: FieldHandle::new(7),
            field_id: "chart--type",
        }
    }

    #[test]
    fn test_inspector_controls() {
        let renderer = InspectorField;
        assert_eq!(renderer.render(request("number", None)).control, ControlKind::Number);
        assert_eq!(renderer.render(request("boolean", None)).control, ControlKind::Toggle);
        assert_eq!(renderer.render(request("color", None)).control, ControlKind::Color);
        assert_eq!(renderer.render(request("array<number>", None)).control, ControlKind::Json);
        assert_eq!(renderer.render(request("mystery", None)).control, ControlKind::Text);

        let choice = renderer.render(request("options", Some(vec![json!("line"), json!(3)])));
        assert_eq!(choice.control, ControlKind::Choice(vec!["line".to_string(), "3".to_string()]));
        assert_eq!(choice.handle, FieldHandle::new(7));
        assert_eq!(choice.field_id, "chart--type");
    }

    #[test]
    fn test_coerce_input() {
        assert_eq!(ControlKind::Number.coerce("12"), json!(12));
        assert_eq!(ControlKind::Number.coerce("1.5"), json!(1.5));
        assert_eq!(ControlKind::Number.coerce("wide"), json!("wide"));
        assert_eq!(ControlKind::Toggle.coerce("on"), json!(true));
        assert_eq!(ControlKind::Json.coerce(r#"{"color": "red"}"#), json!({"color": "red"}));
        assert_eq!(ControlKind::Text.coerce(" padded "), json!(" padded "));
    }

    #[test]
    fn test_handle_display() {
        assert_eq!(FieldHandle::new(3).to_string(), "#3");
        assert_eq!(FieldHandle::new(3).raw(), 3);
    }
}
