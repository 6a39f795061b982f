//! Form field collection and value coercion.
//!
//! Fields are gathered in tree order the way a browser builds form data, then
//! every value is coerced according to the control that produced it.

use chrono::{NaiveDate, NaiveDateTime, SecondsFormat};
use dom::{Document, NodeId};
use serde_json::{Map, Number, Value};

/// How a control's value is coerced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    /// `<input type="number">`
    Number,
    /// `<input type="date">`
    Date,
    /// `<input type="datetime-local">`
    DateTimeLocal,
    /// `<select>`
    Select,
    /// Anything else.
    Text,
}

impl FieldKind {
    /// Classify a control element.
    pub fn of(document: &Document, control: NodeId) -> Self {
        if document.tag_name(control).as_deref() == Some("select") {
            return Self::Select;
        }
        match input_type(document, control).as_str() {
            "number" => Self::Number,
            "date" => Self::Date,
            "datetime-local" => Self::DateTimeLocal,
            _ => Self::Text,
        }
    }
}

fn input_type(document: &Document, control: NodeId) -> String {
    document
        .get_attribute(control, "type")
        .unwrap_or_default()
        .to_ascii_lowercase()
}

fn parse_number(value: &str) -> Option<Value> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    let number: f64 = trimmed.parse().ok()?;
    if !number.is_finite() {
        return None;
    }
    if number.fract() == 0.0 && number.abs() < 9_007_199_254_740_992.0 {
        return Some(Value::Number(Number::from(number as i64)));
    }
    Number::from_f64(number).map(Value::Number)
}

fn parse_date(value: &str) -> Option<Value> {
    let date = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()?;
    Some(Value::String(date.format("%Y-%m-%d").to_string()))
}

fn parse_datetime_local(value: &str) -> Option<Value> {
    let trimmed = value.trim();
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .map(|datetime| {
            Value::String(
                datetime
                    .and_utc()
                    .to_rfc3339_opts(SecondsFormat::Millis, true),
            )
        })
}

/// Coerce one raw value. Values that do not parse for their kind stay text.
pub fn coerce_field(kind: FieldKind, value: &str) -> Value {
    let coerced = match kind {
        FieldKind::Number | FieldKind::Select => parse_number(value),
        FieldKind::Date => parse_date(value),
        FieldKind::DateTimeLocal => parse_datetime_local(value),
        FieldKind::Text => None,
    };
    coerced.unwrap_or_else(|| Value::String(value.to_owned()))
}

fn option_value(document: &Document, option: NodeId) -> String {
    document
        .get_attribute(option, "value")
        .unwrap_or_else(|| document.text_content(option).trim().to_owned())
}

fn select_value(document: &Document, select: NodeId) -> Option<String> {
    let options = document.elements_by_tag_name(select, "option");
    let chosen = options
        .iter()
        .copied()
        .find(|option| document.has_attribute(*option, "selected"))
        .or_else(|| options.first().copied())?;
    Some(option_value(document, chosen))
}

/// The value a control contributes, if it contributes one.
fn control_value(document: &Document, control: NodeId, submitter: Option<NodeId>) -> Option<String> {
    let tag = document.tag_name(control)?;
    match tag.as_str() {
        "input" => match input_type(document, control).as_str() {
            "checkbox" | "radio" => document
                .has_attribute(control, "checked")
                .then(|| document.get_attribute(control, "value").unwrap_or_else(|| "on".to_owned())),
            "submit" | "image" => (submitter == Some(control))
                .then(|| document.get_attribute(control, "value").unwrap_or_default()),
            "file" | "button" | "reset" => None,
            _ => Some(document.get_attribute(control, "value").unwrap_or_default()),
        },
        "select" => select_value(document, control),
        "textarea" => Some(document.text_content(control)),
        "button" => (submitter == Some(control))
            .then(|| document.get_attribute(control, "value").unwrap_or_default()),
        _ => None,
    }
}

const CONTROL_TAGS: [&str; 4] = ["input", "select", "textarea", "button"];

/// Named, enabled controls of `form` with their raw values, in tree order.
pub fn form_entries(document: &Document, form: NodeId, submitter: Option<NodeId>) -> Vec<(String, String, NodeId)> {
    let controls: Vec<NodeId> = document
        .descendant_elements(form)
        .into_iter()
        .filter(|node| {
            document
                .tag_name(*node)
                .is_some_and(|tag| CONTROL_TAGS.contains(&tag.as_str()))
        })
        .collect();

    controls
        .into_iter()
        .filter(|control| !document.has_attribute(*control, "disabled"))
        .filter_map(|control| {
            let name = document.get_attribute(control, "name").filter(|name| !name.is_empty())?;
            let value = control_value(document, control, submitter)?;
            Some((name, value, control))
        })
        .collect()
}

/// Serialize a form into one JSON object. Later fields with the same name win.
pub fn serialize_form(document: &Document, form: NodeId, submitter: Option<NodeId>) -> Map<String, Value> {
    form_entries(document, form, submitter)
        .into_iter()
        .map(|(name, value, control)| {
            let coerced = coerce_field(FieldKind::of(document, control), &value);
            (name, coerced)
        })
        .collect()
}
