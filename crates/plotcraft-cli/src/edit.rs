//! `inspect` and `set` commands

use std::cell::RefCell;
use std::fmt::Write;
use std::rc::Rc;

use anyhow::{anyhow, bail, Context, Result};
use serde_json::Value;

use plotcraft_meta::{AdvancedTree, Dictionary, OptionsCatalog};
use plotcraft_ui::{ChartCustomizer, CustomizerConfig, CustomizerSources, Element, PropertyChange};

use crate::MetaArgs;

/// Load the metadata and options named on the command line
pub fn open(args: &MetaArgs, config: CustomizerConfig) -> Result<ChartCustomizer> {
    let catalog = OptionsCatalog::from_path(&args.meta)?;
    let mut sources = CustomizerSources::new(catalog);
    if let Some(path) = &args.advanced {
        sources = sources.with_advanced(AdvancedTree::from_path(path)?);
    }
    if let Some(path) = &args.dictionary {
        sources = sources.with_dictionary(Dictionary::from_path(path)?);
    }

    let options = match &args.options {
        Some(path) => {
            let content = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))?
        }
        None => Value::Object(serde_json::Map::new()),
    };

    let mut customizer = ChartCustomizer::new(sources, config);
    customizer.init(options, None);
    Ok(customizer)
}

/// Interpret a command-line value as JSON, falling back to a string
pub fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Render the outline of a category and optionally an advanced node
pub fn inspect(
    customizer: &mut ChartCustomizer,
    category: Option<&str>,
    node: Option<&str>,
    index: Option<usize>,
) -> Result<String> {
    if let Some(id) = category {
        customizer.select_category(id)?;
    }

    let mut out = String::new();
    if customizer.categories().is_empty() {
        writeln!(out, "(no categories)")?;
    } else {
        write!(out, "{}", customizer.body())?;
    }

    if let Some(node) = node {
        customizer.select_advanced(node, index)?;
        writeln!(out)?;
        write!(out, "{}", customizer.advanced_panel())?;
    }
    Ok(out)
}

/// Arguments of the `set` command
#[derive(Debug, Clone)]
pub struct SetRequest {
    pub field: String,
    pub value: Value,
    pub category: Option<String>,
    pub index: Option<usize>,
}

/// Commit a value to the first rendered field with the requested id
pub fn set(customizer: &mut ChartCustomizer, request: &SetRequest) -> Result<PropertyChange> {
    let categories: Vec<String> = match &request.category {
        Some(id) => vec![id.clone()],
        None => customizer.categories().items().iter().map(|item| item.id.clone()).collect(),
    };

    for category in categories {
        customizer.select_category(&category)?;
        if let Some(index) = request.index {
            select_element(customizer, index)?;
        }

        let Some(handle) = customizer.body().find_field(&request.field).map(|f| f.handle) else {
            continue;
        };

        let changes = Rc::new(RefCell::new(Vec::new()));
        let sink = changes.clone();
        let listener = customizer.on(move |change: &PropertyChange| sink.borrow_mut().push(change.clone()));
        let committed = customizer.commit(handle, request.value.clone());
        customizer.off(listener);
        committed?;

        let change = changes.borrow_mut().pop();
        return change.ok_or_else(|| anyhow!("no change published for {}", request.field));
    }

    bail!("field {} is not shown in any category", request.field)
}

/// Point every master-controlled top-level group at array element `index`
fn select_element(customizer: &mut ChartCustomizer, index: usize) -> Result<()> {
    let slots: Vec<_> = customizer
        .body()
        .elements
        .iter()
        .filter_map(|element| match element {
            Element::Group(group) if group.master.is_some() => Some(group.slot.clone()),
            _ => None,
        })
        .collect();

    for slot in slots {
        customizer
            .select_master(&slot, index)
            .with_context(|| format!("selecting element {index} in group {slot}"))?;
    }
    Ok(())
}
