//! Retained render surface
//!
//! Widgets render into a [`Panel`]: a tree of [`Element`]s describing the
//! groups, master selectors, placeholders and field controls to show. A
//! toolkit front end walks the panel to draw it; the widgets mutate it in
//! place when a selection or filter changes.

use std::fmt;

use serde_json::Value;

use crate::field::{FieldControl, FieldHandle};
use crate::form::FilterContext;

/// Placeholder shown when a master selector has nothing to choose from
pub const NO_DATA_MESSAGE: &str = "No data to display..";

/// Which customizer view an element lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    /// Category list + form
    Simple,
    /// Option tree + flat entry list
    Advanced,
}

/// Position of a group within the rendered category.
///
/// The first index is the group's position among the category's groups;
/// each further index is a child position inside the enclosing group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(Vec<usize>);

impl SlotId {
    /// Slot of a top-level node
    #[must_use]
    pub fn root(index: usize) -> Self {
        Self(vec![index])
    }

    /// Slot of a child of this slot
    #[must_use]
    pub fn child(&self, index: usize) -> Self {
        let mut path = self.0.clone();
        path.push(index);
        Self(path)
    }

    /// The index path
    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.0
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join("."))
    }
}

/// Dropdown choosing which array element a group edits
#[derive(Debug, Clone, PartialEq)]
pub struct MasterSelector {
    /// One label per candidate
    pub labels: Vec<String>,
    /// Selected candidate
    pub selected: usize,
}

/// A rendered metadata group
#[derive(Debug, Clone)]
pub struct GroupElement {
    /// Where the group sits in the category
    pub slot: SlotId,
    /// Localized heading
    pub heading: Option<String>,
    /// Master selector, for controlled groups
    pub master: Option<MasterSelector>,
    /// Rendered children
    pub children: Vec<Element>,
    /// Context the children were rendered with
    pub(crate) context: FilterContext,
}

/// A node of the render surface
#[derive(Debug, Clone)]
pub enum Element {
    /// A titled group of controls
    Group(GroupElement),
    /// A single field control
    Field(FieldControl),
    /// Informational text standing in for content that cannot be shown
    Placeholder(String),
}

/// A render target
#[derive(Debug, Clone, Default)]
pub struct Panel {
    /// Optional heading (used by the advanced view)
    pub heading: Option<String>,
    /// Top-level elements in order
    pub elements: Vec<Element>,
}

impl Panel {
    /// Create an empty panel
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove everything
    pub fn clear(&mut self) {
        self.heading = None;
        self.elements.clear();
    }

    /// Whether nothing is rendered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Every field control, depth first
    #[must_use]
    pub fn fields(&self) -> Vec<&FieldControl> {
        let mut out = Vec::new();
        collect_fields(&self.elements, &mut out);
        out
    }

    /// Ids of every field control, depth first
    #[must_use]
    pub fn field_ids(&self) -> Vec<&str> {
        self.fields().into_iter().map(|f| f.field_id.as_str()).collect()
    }

    /// Number of field controls
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.fields().len()
    }

    /// First control editing `field_id`
    #[must_use]
    pub fn find_field(&self, field_id: &str) -> Option<&FieldControl> {
        self.fields().into_iter().find(|f| f.field_id == field_id)
    }

    /// Control registered under `handle`
    #[must_use]
    pub fn field_by_handle(&self, handle: FieldHandle) -> Option<&FieldControl> {
        self.fields().into_iter().find(|f| f.handle == handle)
    }

    /// Mutable access to the control registered under `handle`
    pub fn field_by_handle_mut(&mut self, handle: FieldHandle) -> Option<&mut FieldControl> {
        fn walk(elements: &mut [Element], handle: FieldHandle) -> Option<&mut FieldControl> {
            for element in elements {
                match element {
                    Element::Field(field) if field.handle == handle => return Some(field),
                    Element::Group(group) => {
                        if let Some(found) = walk(&mut group.children, handle) {
                            return Some(found);
                        }
                    }
                    _ => {}
                }
            }
            None
        }
        walk(&mut self.elements, handle)
    }

    /// Placeholder messages, depth first
    #[must_use]
    pub fn placeholders(&self) -> Vec<&str> {
        fn walk<'a>(elements: &'a [Element], out: &mut Vec<&'a str>) {
            for element in elements {
                match element {
                    Element::Placeholder(text) => out.push(text),
                    Element::Group(group) => walk(&group.children, out),
                    Element::Field(_) => {}
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.elements, &mut out);
        out
    }

    /// The group rendered at `slot`
    #[must_use]
    pub fn group(&self, slot: &SlotId) -> Option<&GroupElement> {
        fn walk<'a>(elements: &'a [Element], slot: &SlotId) -> Option<&'a GroupElement> {
            elements.iter().find_map(|element| match element {
                Element::Group(group) if &group.slot == slot => Some(group),
                Element::Group(group) => walk(&group.children, slot),
                _ => None,
            })
        }
        walk(&self.elements, slot)
    }

    /// Mutable access to the group rendered at `slot`
    pub fn group_mut(&mut self, slot: &SlotId) -> Option<&mut GroupElement> {
        fn walk<'a>(elements: &'a mut [Element], slot: &SlotId) -> Option<&'a mut GroupElement> {
            for element in elements {
                if let Element::Group(group) = element {
                    if &group.slot == slot {
                        return Some(group);
                    }
                    if let Some(found) = walk(&mut group.children, slot) {
                        return Some(found);
                    }
                }
            }
            None
        }
        walk(&mut self.elements, slot)
    }

    /// Handles of every field control, depth first
    #[must_use]
    pub fn handles(&self) -> Vec<FieldHandle> {
        self.fields().into_iter().map(|f| f.handle).collect()
    }
}

impl GroupElement {
    /// Handles of every field control inside this group
    #[must_use]
    pub fn handles(&self) -> Vec<FieldHandle> {
        let mut out = Vec::new();
        collect_fields(&self.children, &mut out);
        out.into_iter().map(|f| f.handle).collect()
    }

    /// Ids of the field controls inside this group
    #[must_use]
    pub fn field_ids(&self) -> Vec<&str> {
        let mut out = Vec::new();
        collect_fields(&self.children, &mut out);
        out.into_iter().map(|f| f.field_id.as_str()).collect()
    }
}

fn collect_fields<'a>(elements: &'a [Element], out: &mut Vec<&'a FieldControl>) {
    for element in elements {
        match element {
            Element::Field(field) => out.push(field),
            Element::Group(group) => collect_fields(&group.children, out),
            Element::Placeholder(_) => {}
        }
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(s) => format!("{s:?}"),
        other => other.to_string(),
    }
}

fn write_elements(f: &mut fmt::Formatter<'_>, elements: &[Element], depth: usize) -> fmt::Result {
    let indent = "  ".repeat(depth);
    for element in elements {
        match element {
            Element::Group(group) => {
                writeln!(f, "{indent}[{}] {}", group.slot, group.heading.as_deref().unwrap_or(""))?;
                if let Some(master) = &group.master {
                    let labels: Vec<String> = master
                        .labels
                        .iter()
                        .enumerate()
                        .map(|(i, l)| if i == master.selected { format!("<{l}>") } else { l.clone() })
                        .collect();
                    writeln!(f, "{indent}  selector: {}", labels.join(" | "))?;
                }
                write_elements(f, &group.children, depth + 1)?;
            }
            Element::Field(field) => {
                writeln!(
                    f,
                    "{indent}- {} ({}) {} = {}",
                    field.field_id,
                    field.kind,
                    field.options.title,
                    display_value(&field.value)
                )?;
            }
            Element::Placeholder(text) => writeln!(f, "{indent}! {text}")?,
        }
    }
    Ok(())
}

impl fmt::Display for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(heading) = &self.heading {
            writeln!(f, "{heading}")?;
        }
        write_elements(f, &self.elements, 0)
    }
}
