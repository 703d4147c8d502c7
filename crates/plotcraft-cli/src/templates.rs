//! `templates` command

use std::fmt::Write;
use std::path::Path;
use std::rc::Rc;

use anyhow::Result;

use plotcraft_meta::TemplateCatalog;
use plotcraft_ui::{ChartTemplateSelector, TemplateSelectorConfig};

/// List template groups and previews, optionally selecting one template
pub fn browse(path: &Path, config: TemplateSelectorConfig, group: Option<&str>, select: Option<&str>) -> Result<String> {
    let catalog = Rc::new(TemplateCatalog::from_path(path)?);
    let mut picker = ChartTemplateSelector::new(Rc::clone(&catalog), config);
    if let Some(group) = group {
        picker.show_templates(group)?;
    }

    let mut out = String::new();
    let current = picker.groups().selected_id().unwrap_or_default().to_string();
    for item in picker.groups().items() {
        let marker = if item.id == current { '>' } else { ' ' };
        writeln!(out, "{marker} {} ({})", item.title, item.id)?;
    }

    if let Some(key) = select {
        picker.click(key)?;
    }
    writeln!(out)?;
    for preview in picker.previews() {
        let marker = if preview.selected { '*' } else { '-' };
        writeln!(out, "{marker} {} [{}]", preview.title, preview.key)?;
    }

    if let Some(selected) = picker.selected() {
        if let Some(template) = catalog.group(&selected.group).and_then(|g| g.template(&selected.name)) {
            writeln!(out)?;
            writeln!(out, "{}", serde_json::to_string_pretty(&template.config)?)?;
        }
    }
    Ok(out)
}
