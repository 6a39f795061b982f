//! Removable widget that reports the status of a submission.

use anyhow::Result;
use component::{Command, Component, ComponentError, component, properties};
use dom::{Document, HostValue, NodeId};
use fetch::Response;
use serde_json::{Value, json};

/// Class carried by the widget's root element.
pub const RESPONSE_WIDGET_CLASS: &str = "form_response_component";

/// Commands accepted by the response-status widget.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResponseStatusCommand {
    /// Show a response's status, or `pending` for `None`.
    SetStatus(Option<Response>),
}

/// Encode the parts of a response the widget displays.
pub fn response_value(response: &Response) -> HostValue {
    HostValue::Json(json!({
        "status": response.status,
        "status_text": response.status_text,
    }))
}

impl Command for ResponseStatusCommand {
    fn name(&self) -> &'static str {
        match self {
            Self::SetStatus(_) => "set_status",
        }
    }

    fn into_arguments(self) -> Vec<HostValue> {
        match self {
            Self::SetStatus(response) => {
                vec![response.as_ref().map_or(HostValue::Null, response_value)]
            }
        }
    }
}

fn status_text(response: &HostValue) -> String {
    let Some(value) = response.as_json() else {
        return "pending".to_owned();
    };
    let status = value.get("status").and_then(Value::as_u64).unwrap_or_default();
    let reason = value.get("status_text").and_then(Value::as_str).unwrap_or_default();
    format!("Response status: {status} {reason}")
}

fn show_status(document: &Document, text: NodeId, response: &HostValue) -> Result<()> {
    document.set_text_content(text, &status_text(response))
}

/// The response-status widget: a `pending` label with an `X` button that
/// removes the widget. The `set_status` callback switches the label to
/// `Response status: <status> <status text>`.
///
/// # Errors
/// Never fails for a fresh builder; the error type is that of the builder.
pub fn form_response_component() -> Result<Component, ComponentError> {
    let builder = component();
    builder
        .properties(properties! { "response" => HostValue::Null })?
        .factory(|context| {
            let document = context.document().clone();
            let root = document.create_element("div");
            document.set_attribute(root, "class", RESPONSE_WIDGET_CLASS)?;

            let text = document.create_element("span");
            let initial = context.properties().get("response").cloned().unwrap_or_default();
            show_status(&document, text, &initial)?;
            document.append_child(root, text)?;

            let x_button = document.create_element("button");
            document.set_attribute(x_button, "type", "button")?;
            document.set_attribute(x_button, "style", "display: inline; margin-left: 1rem")?;
            document.set_text_content(x_button, "X")?;
            document.add_node_listener(x_button, "click", move |host, _event| {
                host.remove(root);
                Ok(())
            })?;
            document.append_child(root, x_button)?;
            context.append(root)?;

            context.add_callback("set_status", move |arguments| {
                let response = arguments.into_iter().next().unwrap_or_default();
                show_status(&document, text, &response)?;
                Ok(HostValue::Undefined)
            });
            Ok(())
        })?;
    Ok(builder.build())
}
