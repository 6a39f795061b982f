//! One entry of the images list.

use std::rc::Rc;

use anyhow::Result;
use component::{Component, ComponentError, FromProperties, Properties, component, properties};
use dom::{Document, HostFunction, HostValue, NodeId};
use fetch::{Client, FetchOptions, Method, Request, fetch_checked};
use forms::ResponseStatusCommand;
use log::debug;
use tokio::task::spawn_local;

use crate::helpers::{element, refetch};
use crate::image::ItemImage;

/// Typed properties of a list item.
pub struct ListItemProperties {
    pub item_image: ItemImage,
    pub refetch_images: Option<HostFunction>,
}

impl FromProperties for ListItemProperties {
    fn from_properties(properties: &Properties) -> Result<Self, ComponentError> {
        Ok(Self {
            item_image: ItemImage::from_property(properties, "item_image")?,
            refetch_images: properties.optional_function("refetch_images")?,
        })
    }
}

struct Deletion {
    client: Client,
    response_widget: Component,
    document: Document,
    item_image: ItemImage,
    refetch_images: Option<HostFunction>,
    error_target: NodeId,
    result_target: NodeId,
}

impl Deletion {
    fn start(&self) -> Result<()> {
        let image = &self.item_image;
        let url = self
            .client
            .config()
            .api_endpoint(&["item", &image.item_id, "image", &image.id])?;
        let widget = self.response_widget.instantiate(&self.document)?;
        widget.append_self(self.result_target)?;

        debug!("deleting image {} of item {}", image.id, image.item_id);
        let options = FetchOptions::new()
            .error_target(&self.document, self.error_target)
            .response_handler(move |response| {
                widget.dispatch(ResponseStatusCommand::SetStatus(Some(response.clone())))?;
                Ok(())
            });
        let client = self.client.clone();
        let refetch_images = self.refetch_images.clone();
        spawn_local(async move {
            if fetch_checked(&client, Request::new(Method::DELETE, url), options)
                .await
                .is_ok()
            {
                refetch(refetch_images.as_ref());
            }
        });
        Ok(())
    }
}

/// A list entry linking to the image, with its alt text and an `X` button
/// that deletes the image and then calls `refetch_images`.
///
/// Deletion spawns onto the current [`tokio::task::LocalSet`].
///
/// Status is shown with `response_widget`, normally
/// [`forms::form_response_component`].
///
/// # Errors
/// Never fails for a fresh builder.
pub fn item_image_list_item_component(
    client: &Client,
    response_widget: Component,
) -> Result<Component, ComponentError> {
    let client = client.clone();
    let builder = component();
    builder
        .properties(properties! {
            "item_image" => HostValue::Null,
            "refetch_images" => HostValue::Null,
        })?
        .factory(move |context| {
            let ListItemProperties {
                item_image,
                refetch_images,
            } = ListItemProperties::from_properties(context.properties())?;
            let document = context.document().clone();

            let uri = item_image.image_uri(client.config())?;
            let link = element(&document, "a", &[("href", uri.as_str()), ("target", "_blank")], Some(&item_image.id))?;
            let label = element(&document, "span", &[], Some(&item_image.alt_label()))?;
            let x_button = element(
                &document,
                "button",
                &[("type", "button"), ("style", "display: inline; margin-left: 1rem")],
                Some("X"),
            )?;
            let error_target = element(&document, "div", &[], None)?;
            let result_target = element(&document, "div", &[], None)?;
            let item = element(&document, "li", &[], None)?;
            document.append_children(item, &[link, label, x_button, error_target, result_target])?;
            context.append(item)?;

            let deletion = Rc::new(Deletion {
                client: client.clone(),
                response_widget: response_widget.clone(),
                document: document.clone(),
                item_image,
                refetch_images,
                error_target,
                result_target,
            });
            let on_click = Rc::clone(&deletion);
            document.add_node_listener(x_button, "click", move |_host, _event| on_click.start())?;
            context.add_action("delete", move || deletion.start());
            Ok(())
        })?;
    Ok(builder.build())
}
