//! Document-wide JSON form submission.

use anyhow::Result;
use component::{Component, ComponentError};
use dom::{Document, NodeId};
use fetch::{Client, Method, Request};
use log::{debug, error, warn};
use serde_json::Value;
use tokio::task::{JoinHandle, spawn_local};

use crate::response::{RESPONSE_WIDGET_CLASS, ResponseStatusCommand, form_response_component};
use crate::serialize::serialize_form;

/// Sends forms as JSON instead of letting the host submit them.
#[derive(Clone)]
pub struct FormSubmitter {
    client: Client,
    response_widget: Component,
}

impl FormSubmitter {
    /// A submitter sending through `client`. The status widget is built once
    /// and shared by every submission.
    ///
    /// # Errors
    /// See [`form_response_component`].
    pub fn new(client: Client) -> Result<Self, ComponentError> {
        Ok(Self {
            client,
            response_widget: form_response_component()?,
        })
    }

    /// The status widget shown in submitted forms.
    pub const fn response_widget(&self) -> &Component {
        &self.response_widget
    }

    /// Register one document-wide `submit` listener that takes over every
    /// form submission.
    ///
    /// Submissions spawn their request with [`spawn_local`], so events must
    /// be dispatched from inside a [`tokio::task::LocalSet`].
    ///
    /// # Errors
    /// See [`FormSubmitter::new`].
    pub fn install(document: &Document, client: Client) -> Result<Self, ComponentError> {
        let submitter = Self::new(client)?;
        let listener = submitter.clone();
        document.add_event_listener("submit", move |host, event| {
            event.prevent_default();
            event.stop_propagation();
            let form = event.target();
            if host.tag_name(form).as_deref() != Some("form") {
                warn!("submit event dispatched at a non-form node {form:?}");
                return Ok(());
            }
            listener.submit(host, form, event.submitter())?;
            Ok(())
        });
        Ok(submitter)
    }

    /// Serialize `form`, show a fresh status widget in it and send the request.
    /// The returned task finishes once the widget shows the response status.
    ///
    /// # Errors
    /// Fails if the form's `action` or `data-method` is invalid, or if the
    /// status widget cannot be mounted.
    ///
    /// # Panics
    /// Panics when called outside a [`tokio::task::LocalSet`].
    pub fn submit(&self, document: &Document, form: NodeId, submitter: Option<NodeId>) -> Result<JoinHandle<()>> {
        let body = serialize_form(document, form, submitter);

        let action = document.get_attribute(form, "action").unwrap_or_default();
        let url = self.client.config().base_url.join(&action)?;
        let method_name = document
            .get_attribute(form, "data-method")
            .unwrap_or_else(|| "POST".to_owned())
            .to_ascii_uppercase();
        let method = Method::from_bytes(method_name.as_bytes())?;
        let request = Request::new(method, url).with_json(&Value::Object(body));

        let widget = self.response_widget.instantiate(document)?;
        if let Some(previous) = document.elements_by_class_name(form, RESPONSE_WIDGET_CLASS).first() {
            document.remove(*previous);
        }
        widget.append_self(form)?;

        debug!("submitting form to {} {}", request.method, request.url);
        let client = self.client.clone();
        Ok(spawn_local(async move {
            let description = format!("{} {}", request.method, request.url);
            match client.send(request).await {
                Ok(response) => {
                    if let Err(status_error) = widget.dispatch(ResponseStatusCommand::SetStatus(Some(response))) {
                        error!("could not show response status: {status_error:#}");
                    }
                }
                Err(send_error) => error!("{description} failed: {send_error}"),
            }
        }))
    }
}
