//! Element and property helpers shared by the widgets.

use anyhow::Result;
use component::{ComponentError, Properties};
use dom::{Document, HostFunction, HostValue, NodeId};

/// Create an element with attributes and optional text.
pub fn element(document: &Document, tag: &str, attributes: &[(&str, &str)], text: Option<&str>) -> Result<NodeId> {
    let node = document.create_element(tag);
    for (name, value) in attributes {
        document.set_attribute(node, name, value)?;
    }
    if let Some(content) = text {
        document.set_text_content(node, content)?;
    }
    Ok(node)
}

/// Read an identifier property given either as a string or as a number.
pub fn identifier(properties: &Properties, name: &str) -> Result<String, ComponentError> {
    match properties.get(name) {
        Some(value @ (HostValue::String(_) | HostValue::Number(_))) => Ok(value.to_string()),
        _ => Err(ComponentError::InvalidProperty {
            name: name.to_owned(),
            expected: "a string or number identifier",
        }),
    }
}

/// Read a text property; nullish values read as empty text.
pub fn text(properties: &Properties, name: &str) -> String {
    properties
        .get(name)
        .filter(|value| !value.is_nullish())
        .map(ToString::to_string)
        .unwrap_or_default()
}

/// Run an optional `refetch_images` callback, logging its failure.
pub fn refetch(callback: Option<&HostFunction>) {
    if let Some(function) = callback
        && let Err(error) = function.call(Vec::new())
    {
        log::error!("refetching images failed: {error:#}");
    }
}
