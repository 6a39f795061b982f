//! Upload form for new item images.

use std::rc::Rc;

use anyhow::Result;
use component::{Component, ComponentError, FromProperties, Properties, component, properties};
use dom::{Document, HostFunction, HostValue, NodeId};
use fetch::{Client, FetchOptions, Method, Request, fetch_checked};
use forms::ResponseStatusCommand;
use log::debug;
use tokio::task::spawn_local;

use crate::helpers::{element, identifier, refetch};

/// Typed properties of the upload form.
pub struct UploadFormProperties {
    pub item_id: String,
    pub refetch_images: Option<HostFunction>,
}

impl FromProperties for UploadFormProperties {
    fn from_properties(properties: &Properties) -> Result<Self, ComponentError> {
        Ok(Self {
            item_id: identifier(properties, "item_id")?,
            refetch_images: properties.optional_function("refetch_images")?,
        })
    }
}

struct Upload {
    client: Client,
    response_widget: Component,
    document: Document,
    item_id: String,
    refetch_images: Option<HostFunction>,
    alt_text_input: NodeId,
    file_input: NodeId,
    error_container: NodeId,
    result_container: NodeId,
}

impl Upload {
    /// Validate the inputs and send the file. Validation problems are shown in
    /// the error container and are not errors.
    fn start(&self) -> Result<()> {
        let alt_text = self
            .document
            .get_attribute(self.alt_text_input, "value")
            .unwrap_or_default();
        if alt_text.is_empty() {
            return self.document.set_text_content(self.error_container, "Alt text required");
        }
        let Some(file) = self.document.files(self.file_input).into_iter().next() else {
            return self.document.set_text_content(self.error_container, "File required");
        };
        self.document.clear_children(self.error_container);

        let mut url = self
            .client
            .config()
            .api_endpoint(&["item", &self.item_id, "image"])?;
        url.query_pairs_mut()
            .append_pair("alt_text", &alt_text)
            .append_pair("original_file_name", &file.name);
        let request = Request::new(Method::POST, url).with_body(file.bytes);

        let widget = self.response_widget.instantiate(&self.document)?;
        widget.append_self(self.result_container)?;

        debug!("uploading {} for item {}", file.name, self.item_id);
        let options = FetchOptions::new()
            .error_target(&self.document, self.error_container)
            .response_handler(move |response| {
                widget.dispatch(ResponseStatusCommand::SetStatus(Some(response.clone())))?;
                Ok(())
            });
        let client = self.client.clone();
        let refetch_images = self.refetch_images.clone();
        spawn_local(async move {
            if fetch_checked(&client, request, options).await.is_ok() {
                refetch(refetch_images.as_ref());
            }
        });
        Ok(())
    }
}

/// Alt text and file inputs with a submit button. A successful upload calls
/// `refetch_images`.
///
/// Uploads spawn onto the current [`tokio::task::LocalSet`].
///
/// Status is shown with `response_widget`, normally
/// [`forms::form_response_component`].
///
/// # Errors
/// Never fails for a fresh builder.
pub fn item_image_upload_form_component(
    client: &Client,
    response_widget: Component,
) -> Result<Component, ComponentError> {
    let client = client.clone();
    let builder = component();
    builder
        .properties(properties! {
            "item_id" => HostValue::Null,
            "refetch_images" => HostValue::Null,
        })?
        .factory(move |context| {
            let UploadFormProperties {
                item_id,
                refetch_images,
            } = UploadFormProperties::from_properties(context.properties())?;
            let document = context.document().clone();

            let heading = element(&document, "h3", &[("style", "margin-top: .5rem")], Some("Upload"))?;
            let label = element(
                &document,
                "label",
                &[("for", "alt_text"), ("style", "margin-right: 1rem")],
                Some("Alt text"),
            )?;
            let alt_text_input = element(&document, "input", &[("type", "text"), ("name", "alt_text")], None)?;
            let file_input = element(&document, "input", &[("type", "file"), ("name", "file")], None)?;
            let submit = element(&document, "button", &[], Some("Submit"))?;
            let error_container = element(&document, "div", &[], None)?;
            let result_container = element(&document, "div", &[], None)?;
            let form = element(&document, "div", &[], None)?;
            document.append_children(
                form,
                &[heading, label, alt_text_input, file_input, submit, error_container, result_container],
            )?;
            context.append(form)?;

            let upload = Rc::new(Upload {
                client: client.clone(),
                response_widget: response_widget.clone(),
                document: document.clone(),
                item_id,
                refetch_images,
                alt_text_input,
                file_input,
                error_container,
                result_container,
            });
            let on_click = Rc::clone(&upload);
            document.add_node_listener(submit, "click", move |_host, _event| on_click.start())?;
            context.add_action("upload", move || upload.start());
            Ok(())
        })?;
    Ok(builder.build())
}
