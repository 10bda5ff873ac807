//! Maps an extraction result to a display tree.
//!
//! Everything here is pure: the UI calls [`render`] every frame and
//! draws whatever comes back.

mod sections;

pub use sections::{SectionKind, SectionSpec, SECTIONS};

use crate::extract::ExtractionResult;
use crate::utils::number_format::NumberFormat;
use serde_json::{Map, Value};

const AMOUNT_FIELD: &str = "amount";

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedResult {
    pub blocks: Vec<RenderedBlock>,
}

impl RenderedResult {
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderedBlock {
    Section(RenderedSection),
    Items(RenderedItems),
    Summary(RenderedSection),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedSection {
    pub spec: SectionSpec,
    pub fields: Vec<RenderedField>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedItems {
    pub spec: SectionSpec,
    pub title: String,
    pub cards: Vec<ItemCard>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemCard {
    pub label: String,
    /// Formatted `amount`, shown as the card's headline when present.
    pub amount: Option<String>,
    pub fields: Vec<RenderedField>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedField {
    pub key: String,
    pub label: String,
    pub value: String,
}

pub fn render(result: &ExtractionResult) -> RenderedResult {
    let blocks = SECTIONS
        .iter()
        .filter_map(|spec| {
            let payload = result.section(spec.key)?;
            match spec.kind {
                SectionKind::Fields => render_fields(payload.as_object()?, |_, v| display_value(v))
                    .map(|fields| RenderedBlock::Section(RenderedSection { spec: *spec, fields })),
                SectionKind::Summary => render_fields(payload.as_object()?, |_, v| currency_or_raw(v))
                    .map(|fields| RenderedBlock::Summary(RenderedSection { spec: *spec, fields })),
                SectionKind::Items => render_items(spec, payload.as_array()?).map(RenderedBlock::Items),
            }
        })
        .collect();

    RenderedResult { blocks }
}

fn render_items(spec: &SectionSpec, items: &[Value]) -> Option<RenderedItems> {
    if items.is_empty() {
        return None;
    }

    let cards = items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let fields = item
                .as_object()
                .and_then(|fields| render_fields(fields, item_value))
                .unwrap_or_default();
            let amount = item
                .get(AMOUNT_FIELD)
                .filter(|v| is_visible(v))
                .map(currency_or_raw);

            ItemCard {
                label: format!("Item {}", index + 1),
                amount,
                fields,
            }
        })
        .collect();

    Some(RenderedItems {
        spec: *spec,
        title: format!("{} ({})", spec.title, items.len()),
        cards,
    })
}

/// Visible fields of a flat map, or `None` when nothing survives suppression.
fn render_fields(
    fields: &Map<String, Value>,
    format: impl Fn(&str, &Value) -> String,
) -> Option<Vec<RenderedField>> {
    let rendered: Vec<RenderedField> = fields
        .iter()
        .filter(|(_, value)| is_visible(value))
        .map(|(key, value)| RenderedField {
            key: key.clone(),
            label: field_label(key),
            value: format(key, value),
        })
        .collect();

    (!rendered.is_empty()).then_some(rendered)
}

fn item_value(key: &str, value: &Value) -> String {
    if key == AMOUNT_FIELD {
        currency_or_raw(value)
    } else {
        display_value(value)
    }
}

/// Null, empty and zero values are hidden. This also hides legitimate
/// zero quantities.
pub fn is_visible(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Number(n) => n.as_f64() != Some(0.0),
        _ => true,
    }
}

pub fn field_label(key: &str) -> String {
    key.replace('_', " ")
}

fn currency_or_raw(value: &Value) -> String {
    NumberFormat::parse_decimal(value)
        .map(NumberFormat::currency)
        .unwrap_or_else(|| display_value(value))
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
