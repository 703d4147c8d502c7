//! Advanced view rendering
//!
//! The advanced view shows the flat entry list of one option-tree node.
//! Entries are filtered by the node's sub-type discriminator, whose value
//! is read from the options when the node is selected and replaced when
//! the discriminator entry itself is committed.

use plotcraft_meta::{uncamelize, AdvancedNode, OptionsState};

use crate::field::{FieldOptions, FieldRenderer, FieldRequest};
use crate::form::{filter_value_of, Binding, BindingRegistry};
use crate::surface::{Element, Panel};

/// What the advanced view is currently showing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvancedSelection {
    pub node_id: String,
    pub arr_index: Option<usize>,
    /// Active sub-type filter
    pub filter: Option<String>,
}

/// Current value of the node's discriminator entry
#[must_use]
pub fn discriminator_value(node: &AdvancedNode, options: &OptionsState, arr_index: Option<usize>) -> Option<String> {
    let entry_id = node.discriminator.as_deref()?;
    options.get(entry_id, arr_index).and_then(filter_value_of)
}

/// Render the entries of `node` into `panel`, replacing its content.
///
/// Bindings of the controls previously shown in `panel` are released.
pub fn render_advanced(
    node: &AdvancedNode,
    selection: &AdvancedSelection,
    options: &OptionsState,
    renderer: &dyn FieldRenderer,
    bindings: &mut BindingRegistry,
    panel: &mut Panel,
) {
    bindings.release(panel.handles());
    panel.clear();
    panel.heading = Some(uncamelize(node.display_title()));

    let filter = selection.filter.as_deref();
    for entry in &node.entries {
        if !entry.is_exposed() || !entry.admits_filter(filter) {
            continue;
        }

        let handle = bindings.register(Binding::Advanced {
            field_id: entry.id.clone(),
            node_id: node.id.clone(),
            arr_index: selection.arr_index,
            discriminator: node.discriminator.as_deref() == Some(entry.id.as_str()),
        });

        let control = renderer.render(FieldRequest {
            kind: entry.kind(),
            value: entry.resolve_value(options, selection.arr_index),
            options: FieldOptions {
                title: uncamelize(&entry.short_name),
                tooltip: entry.description.clone().unwrap_or_default(),
                values: entry.values.clone(),
                custom: None,
                defaults: entry.defaults.clone(),
                attributes: entry.attributes.clone(),
            },
            handle,
            field_id: &entry.id,
        });
        panel.elements.push(Element::Field(control));
    }

    tracing::debug!(node = %node.id, ?filter, fields = panel.elements.len(), "advanced view rendered");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::InspectorField;
    use plotcraft_meta::AdvancedEntry;
    use serde_json::json;

    fn series() -> AdvancedNode {
        AdvancedNode::new("series")
            .array()
            .with_discriminator("series--type")
            .with_entry(AdvancedEntry::new("series--type", "type"))
            .with_entry(AdvancedEntry::new("series--lineWidth", "lineWidth").with_sub_type(["line", "spline"]))
            .with_entry(AdvancedEntry::new("series--pointPadding", "pointPadding").with_sub_type(["column"]))
            .with_entry(AdvancedEntry::new("series--internal", ""))
            .with_entry(AdvancedEntry::new("series--visible", "visible").with_defaults(json!(true)))
    }

    fn render(options: &OptionsState, filter: Option<&str>, bindings: &mut BindingRegistry) -> Panel {
        let mut panel = Panel::new();
        let selection = AdvancedSelection {
            node_id: "series".to_string(),
            arr_index: Some(1),
            filter: filter.map(String::from),
        };
        render_advanced(&series(), &selection, options, &InspectorField, bindings, &mut panel);
        panel
    }

    #[test]
    fn test_discriminator_filters_entries() {
        let options = OptionsState::new(json!({"series": [{"type": "column"}, {"type": "line"}]}));
        let filter = discriminator_value(&series(), &options, Some(1));
        assert_eq!(filter.as_deref(), Some("line"));

        let mut bindings = BindingRegistry::new();
        let panel = render(&options, filter.as_deref(), &mut bindings);
        assert_eq!(panel.heading.as_deref(), Some("Series"));
        assert_eq!(panel.field_ids(), vec!["series--type", "series--lineWidth", "series--visible"]);
        assert_eq!(panel.find_field("series--type").unwrap().value, json!("line"));
        assert_eq!(panel.find_field("series--visible").unwrap().value, json!(true));
        assert_eq!(panel.find_field("series--lineWidth").unwrap().options.title, "Line Width");
    }

    #[test]
    fn test_no_filter_shows_all_exposed() {
        let options = OptionsState::new(json!({}));
        let mut bindings = BindingRegistry::new();
        let panel = render(&options, None, &mut bindings);
        assert_eq!(panel.field_count(), 4);
        assert_eq!(bindings.len(), 4);
    }

    #[test]
    fn test_rerender_releases_bindings() {
        let options = OptionsState::new(json!({}));
        let mut bindings = BindingRegistry::new();
        let mut panel = render(&options, None, &mut bindings);
        let stale = panel.find_field("series--type").unwrap().handle;

        let selection = AdvancedSelection {
            node_id: "series".to_string(),
            arr_index: Some(1),
            filter: Some("column".to_string()),
        };
        render_advanced(&series(), &selection, &options, &InspectorField, &mut bindings, &mut panel);

        assert!(bindings.get(stale).is_none());
        assert_eq!(bindings.len(), 3);
        let handle = panel.find_field("series--type").unwrap().handle;
        assert!(matches!(
            bindings.get(handle),
            Some(Binding::Advanced { discriminator: true, arr_index: Some(1), .. })
        ));
    }
}
