//! Chart template picker
//!
//! A group list on one side and a grid of template previews on the other.
//! Hovering a preview shows its hint; clicking it selects the template
//! and publishes [`TemplateEvent::Select`].

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use plotcraft_meta::{ChartTemplate, TemplateCatalog, TemplateGroup};

use crate::config::TemplateSelectorConfig;
use crate::error::{UiError, UiResult};
use crate::events::{EventEmitter, ListenerId, TemplateEvent};
use crate::selection::SelectionList;

/// One tile of the preview grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplatePreview {
    pub key: String,
    pub title: String,
    pub image_url: Option<String>,
    pub selected: bool,
}

/// The remembered selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedTemplate {
    /// Group the template was picked from
    pub group: String,
    /// Template key
    pub name: String,
    /// Selection identity: group id, key and title concatenated
    pub id: String,
}

impl SelectedTemplate {
    /// Selection for `template` picked from `group`
    #[must_use]
    pub fn of(group: &str, template: &ChartTemplate) -> Self {
        Self {
            group: group.to_string(),
            name: template.key.clone(),
            id: selection_id(group, template),
        }
    }
}

fn selection_id(group: &str, template: &ChartTemplate) -> String {
    format!("{group}{}{}", template.key, template.title)
}

/// Template picker widget
#[derive(Debug)]
pub struct ChartTemplateSelector {
    catalog: Rc<TemplateCatalog>,
    config: TemplateSelectorConfig,
    groups: SelectionList,
    previews: Vec<TemplatePreview>,
    hint: Option<String>,
    selected: Option<SelectedTemplate>,
    events: EventEmitter<TemplateEvent>,
}

impl ChartTemplateSelector {
    /// Create a picker showing the first group
    #[must_use]
    pub fn new(catalog: Rc<TemplateCatalog>, config: TemplateSelectorConfig) -> Self {
        let mut selector = Self {
            catalog,
            config,
            groups: SelectionList::new(),
            previews: Vec::new(),
            hint: None,
            selected: None,
            events: EventEmitter::new(),
        };
        selector.rebuild();
        selector
    }

    fn offers(&self, template: &ChartTemplate) -> bool {
        self.config.stock_available || !template.requires_stock()
    }

    /// Refill the group list and show the first group.
    ///
    /// Groups with nothing to offer are left out.
    pub fn rebuild(&mut self) {
        self.groups.clear();
        let catalog = Rc::clone(&self.catalog);
        for group in catalog.groups() {
            if group.templates.iter().any(|t| self.offers(t)) {
                self.groups.add_item(group.id.clone(), group.title.clone());
            } else {
                tracing::trace!(group = %group.id, "template group has no usable templates");
            }
        }

        self.previews.clear();
        let first = self.groups.select_first().map(|item| item.id.clone());
        if let Some(id) = first {
            if let Err(e) = self.show_templates(&id) {
                tracing::warn!(error = %e, "cannot show first template group");
            }
        }
    }

    fn shown_group(&self) -> UiResult<&TemplateGroup> {
        let id = self
            .groups
            .selected_id()
            .ok_or_else(|| UiError::UnknownTemplateGroup(String::new()))?;
        self.catalog
            .group(id)
            .ok_or_else(|| UiError::UnknownTemplateGroup(id.to_string()))
    }

    /// Show the previews of a group
    pub fn show_templates(&mut self, group_id: &str) -> UiResult<()> {
        let catalog = Rc::clone(&self.catalog);
        let group = catalog
            .group(group_id)
            .filter(|_| self.groups.select(group_id))
            .ok_or_else(|| UiError::UnknownTemplateGroup(group_id.to_string()))?;

        let current = self.selected.as_ref().map(|s| s.id.as_str());
        self.previews = group
            .templates
            .iter()
            .filter(|t| self.offers(t))
            .map(|t| TemplatePreview {
                key: t.key.clone(),
                title: t.title.clone(),
                image_url: t.url_img.clone(),
                selected: current == Some(selection_id(&group.id, t).as_str()),
            })
            .collect();
        tracing::debug!(group = %group_id, previews = self.previews.len(), "showing templates");
        Ok(())
    }

    fn shown_template(&self, key: &str) -> UiResult<ChartTemplate> {
        if !self.previews.iter().any(|p| p.key == key) {
            return Err(UiError::UnknownTemplate(key.to_string()));
        }
        self.shown_group()?
            .template(key)
            .cloned()
            .ok_or_else(|| UiError::UnknownTemplate(key.to_string()))
    }

    /// The pointer entered a preview. Returns whether a hint is shown.
    pub fn hover(&mut self, key: &str) -> UiResult<bool> {
        let template = self.shown_template(key)?;
        let Some(text) = template.tooltip_text.clone().filter(|text| !text.is_empty()) else {
            return Ok(false);
        };
        self.hint = Some(text);
        self.events.emit(&TemplateEvent::Hover(template));
        Ok(true)
    }

    /// The pointer left a preview
    pub fn leave(&mut self) {
        self.hint = None;
    }

    /// Select a shown template
    pub fn click(&mut self, key: &str) -> UiResult<()> {
        let template = self.shown_template(key)?;
        let group = self.shown_group()?.id.clone();

        for preview in &mut self.previews {
            preview.selected = preview.key == key;
        }
        self.selected = Some(SelectedTemplate::of(&group, &template));
        tracing::debug!(%group, template = %key, "template selected");
        self.events.emit(&TemplateEvent::Select(template));
        Ok(())
    }

    #[must_use]
    pub fn selected(&self) -> Option<&SelectedTemplate> {
        self.selected.as_ref()
    }

    /// Replace the remembered selection and re-mark the shown previews
    pub fn set_selected(&mut self, selected: Option<SelectedTemplate>) {
        self.selected = selected;
        let group = self.groups.selected_id().unwrap_or_default().to_string();
        let current = self.selected.as_ref().map(|s| s.id.clone());
        let catalog = Rc::clone(&self.catalog);
        let templates = catalog.group(&group).map(|g| g.templates.as_slice()).unwrap_or_default();
        for preview in &mut self.previews {
            let id = templates
                .iter()
                .find(|t| t.key == preview.key)
                .map(|t| selection_id(&group, t));
            preview.selected = id.is_some() && id == current;
        }
    }

    #[must_use]
    pub fn groups(&self) -> &SelectionList {
        &self.groups
    }

    #[must_use]
    pub fn previews(&self) -> &[TemplatePreview] {
        &self.previews
    }

    /// Hint text currently shown
    #[must_use]
    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    /// Subscribe to template events
    pub fn on<F>(&self, listener: F) -> ListenerId
    where
        F: FnMut(&TemplateEvent) + 'static,
    {
        self.events.on(listener)
    }

    /// Unsubscribe a listener
    pub fn off(&self, id: ListenerId) -> bool {
        self.events.off(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plotcraft_meta::template::STOCK_CONSTRUCTOR;
    use std::cell::RefCell;

    fn catalog() -> Rc<TemplateCatalog> {
        Rc::new(TemplateCatalog::new(vec![
            TemplateGroup::new(
                "line",
                "Line charts",
                vec![
                    ChartTemplate::new("basic", "Basic line").with_tooltip("A plain line chart"),
                    ChartTemplate::new("stock", "Stock line").with_constr(STOCK_CONSTRUCTOR),
                ],
            ),
            TemplateGroup::new("stockOnly", "Stock", vec![ChartTemplate::new("ohlc", "OHLC").with_constr(STOCK_CONSTRUCTOR)]),
            TemplateGroup::new("bar", "Bar charts", vec![ChartTemplate::new("basic", "Basic bar")]),
        ]))
    }

    fn keys(selector: &ChartTemplateSelector) -> Vec<&str> {
        selector.previews().iter().map(|p| p.key.as_str()).collect()
    }

    #[test]
    fn test_first_group_shown() {
        let selector = ChartTemplateSelector::new(catalog(), TemplateSelectorConfig::default());
        assert_eq!(selector.groups().selected_id(), Some("line"));
        assert_eq!(keys(&selector), vec!["basic", "stock"]);
        assert!(selector.selected().is_none());
    }

    #[test]
    fn test_stock_templates_hidden_when_unavailable() {
        let config = TemplateSelectorConfig { stock_available: false };
        let mut selector = ChartTemplateSelector::new(catalog(), config);
        assert_eq!(keys(&selector), vec!["basic"]);
        assert_eq!(selector.groups().len(), 2);
        assert!(matches!(
            selector.show_templates("stockOnly"),
            Err(UiError::UnknownTemplateGroup(_))
        ));
        assert!(matches!(selector.click("stock"), Err(UiError::UnknownTemplate(_))));
    }

    #[test]
    fn test_hover_and_leave() {
        let mut selector = ChartTemplateSelector::new(catalog(), TemplateSelectorConfig::default());
        let hovered = Rc::new(RefCell::new(Vec::new()));
        let sink = hovered.clone();
        selector.on(move |event: &TemplateEvent| {
            if let TemplateEvent::Hover(t) = event {
                sink.borrow_mut().push(t.key.clone());
            }
        });

        assert!(selector.hover("basic").unwrap());
        assert_eq!(selector.hint(), Some("A plain line chart"));
        assert!(!selector.hover("stock").unwrap());
        assert_eq!(selector.hint(), Some("A plain line chart"));

        selector.leave();
        assert!(selector.hint().is_none());
        assert_eq!(*hovered.borrow(), vec!["basic"]);
    }

    #[test]
    fn test_empty_tooltip_shows_no_hint() {
        let catalog = Rc::new(TemplateCatalog::new(vec![TemplateGroup::new(
            "line",
            "Line charts",
            vec![ChartTemplate::new("plain", "Plain").with_tooltip("")],
        )]));
        let mut selector = ChartTemplateSelector::new(catalog, TemplateSelectorConfig::default());
        let hovered = Rc::new(RefCell::new(0));
        let sink = hovered.clone();
        selector.on(move |_: &TemplateEvent| *sink.borrow_mut() += 1);

        assert!(!selector.hover("plain").unwrap());
        assert!(selector.hint().is_none());
        assert_eq!(*hovered.borrow(), 0);
    }

    #[test]
    fn test_click_marks_and_remembers() {
        let mut selector = ChartTemplateSelector::new(catalog(), TemplateSelectorConfig::default());
        selector.click("basic").unwrap();
        selector.click("stock").unwrap();

        let marked: Vec<bool> = selector.previews().iter().map(|p| p.selected).collect();
        assert_eq!(marked, vec![false, true]);
        assert_eq!(
            selector.selected(),
            Some(&SelectedTemplate {
                group: "line".to_string(),
                name: "stock".to_string(),
                id: "linestockStock line".to_string(),
            })
        );
    }

    #[test]
    fn test_selection_survives_group_switch() {
        let mut selector = ChartTemplateSelector::new(catalog(), TemplateSelectorConfig::default());
        selector.click("basic").unwrap();

        selector.show_templates("bar").unwrap();
        assert!(selector.previews().iter().all(|p| !p.selected));

        selector.show_templates("line").unwrap();
        assert!(selector.previews()[0].selected);
    }

    #[test]
    fn test_set_selected_remarks_previews() {
        let mut selector = ChartTemplateSelector::new(catalog(), TemplateSelectorConfig::default());
        let stock = ChartTemplate::new("stock", "Stock line");
        selector.set_selected(Some(SelectedTemplate::of("line", &stock)));
        assert!(selector.previews()[1].selected);

        selector.set_selected(None);
        assert!(selector.previews().iter().all(|p| !p.selected));
    }
}
