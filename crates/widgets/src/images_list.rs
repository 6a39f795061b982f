//! The images panel of one item: list, heading and upload form.

use std::rc::Rc;

use anyhow::Result;
use component::{Component, ComponentError, FromProperties, Properties, component, properties};
use dom::{Document, HostFunction, HostValue, NodeId};
use fetch::{Body, Client, ErrorTarget, FetchOptions, Request, fetch_checked};
use log::{debug, error};
use serde_json::Value;
use tokio::task::spawn_local;

use crate::helpers::{element, identifier};
use crate::image::ItemImage;

/// Typed properties of the images list.
pub struct ImagesListProperties {
    pub item_id: String,
}

impl FromProperties for ImagesListProperties {
    fn from_properties(properties: &Properties) -> Result<Self, ComponentError> {
        Ok(Self {
            item_id: identifier(properties, "item_id")?,
        })
    }
}

struct ImagesFetcher {
    client: Client,
    document: Document,
    item_id: String,
    list_item: Component,
    list: NodeId,
    content: NodeId,
}

impl ImagesFetcher {
    fn refetch_function(self: &Rc<Self>) -> HostFunction {
        let fetcher = Rc::clone(self);
        HostFunction::from_action(move || fetcher.start())
    }

    fn start(self: &Rc<Self>) -> Result<()> {
        let url = self.client.config().api_endpoint(&["item", &self.item_id, "image"])?;
        debug!("fetching images of item {}", self.item_id);
        let options = FetchOptions::new().error_target(&self.document, self.content).json();
        let fetcher = Rc::clone(self);
        spawn_local(async move {
            let Ok(body) = fetch_checked(&fetcher.client, Request::get(url), options).await else {
                return;
            };
            if let Err(render_error) = fetcher.render(body) {
                error!("could not show images of item {}: {render_error:#}", fetcher.item_id);
                ErrorTarget::new(fetcher.document.clone(), fetcher.content).report(&render_error.to_string());
            }
        });
        Ok(())
    }

    fn render(self: &Rc<Self>, body: Body) -> Result<()> {
        let images: Vec<ItemImage> = serde_json::from_value(body.as_json().cloned().unwrap_or(Value::Null))?;
        // An earlier failure may have replaced the list with its message.
        if self.document.parent(self.list) != Some(self.content) {
            self.document.replace_children(self.content, &[self.list])?;
        }
        self.document.clear_children(self.list);
        if images.is_empty() {
            return self.document.append_text(self.list, "None");
        }
        for image in images {
            let entry = self.list_item.call(
                &self.document,
                properties! {
                    "item_image" => image.to_property()?,
                    "refetch_images" => self.refetch_function(),
                },
            )?;
            entry.append_self(self.list)?;
        }
        Ok(())
    }
}

/// Heading, the list of images and the upload form of one item. The `fetch`
/// callback reloads the list; an empty list shows `None`.
///
/// Fetches spawn onto the current [`tokio::task::LocalSet`].
///
/// # Errors
/// Never fails for a fresh builder.
pub fn item_images_list_component(
    client: &Client,
    list_item: Component,
    upload_form: Component,
) -> Result<Component, ComponentError> {
    let client = client.clone();
    let builder = component();
    builder
        .properties(properties! { "item_id" => HostValue::Null })?
        .factory(move |context| {
            let ImagesListProperties { item_id } = ImagesListProperties::from_properties(context.properties())?;
            let document = context.document().clone();

            let list = element(&document, "ol", &[], None)?;
            let content = element(&document, "div", &[], None)?;
            document.append_child(content, list)?;

            let fetcher = Rc::new(ImagesFetcher {
                client: client.clone(),
                document: document.clone(),
                item_id: item_id.clone(),
                list_item: list_item.clone(),
                list,
                content,
            });
            let form = upload_form.call(
                &document,
                properties! {
                    "item_id" => item_id,
                    "refetch_images" => fetcher.refetch_function(),
                },
            )?;

            let section = element(&document, "div", &[], None)?;
            let rule = element(&document, "hr", &[], None)?;
            let heading = element(&document, "h2", &[], Some("Item images"))?;
            document.append_children(section, &[rule, heading, content])?;
            form.append_self(section)?;
            context.append(section)?;

            context.add_function("fetch", fetcher.refetch_function());
            Ok(())
        })?;
    Ok(builder.build())
}
