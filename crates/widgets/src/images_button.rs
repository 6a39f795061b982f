//! Button that toggles an item's images panel.

use std::rc::Rc;

use anyhow::Result;
use component::{
    Component, ComponentBuilder, ComponentError, FromProperties, PanelSession, Properties, component, properties,
};
use dom::{Document, HostValue};
use log::warn;

use crate::command::ItemImagesCommand;
use crate::helpers::{element, identifier, text};

/// Tag the button is registered under.
pub const ITEM_IMAGES_BUTTON_TAG: &str = "x-item-images-button";

/// Class of the container the images panel opens in.
pub const PANEL_CLASS: &str = "right";

/// Typed properties of the images button.
pub struct ImagesButtonProperties {
    pub text: String,
    pub item_id: String,
}

impl FromProperties for ImagesButtonProperties {
    fn from_properties(properties: &Properties) -> Result<Self, ComponentError> {
        Ok(Self {
            text: text(properties, "text"),
            item_id: identifier(properties, "item_id")?,
        })
    }
}

struct PanelToggle {
    document: Document,
    item_id: String,
    images_list: Component,
    session: PanelSession,
}

impl PanelToggle {
    fn toggle(&self) -> Result<()> {
        let panels = self.document.elements_by_class_name(self.document.root(), PANEL_CLASS);
        let Some(panel) = panels.first().copied() else {
            warn!("no .{PANEL_CLASS} panel to show images of item {}", self.item_id);
            return Ok(());
        };
        let opened = self.session.toggle(&self.item_id, panel, || {
            self.images_list
                .call(&self.document, properties! { "item_id" => self.item_id.as_str() })
        })?;
        if let Some(instance) = opened {
            instance.dispatch(ItemImagesCommand::Fetch)?;
        }
        Ok(())
    }
}

/// A button showing `text`. Clicking it opens the images list of `item_id`
/// in the first `.right` panel, closing whatever panel `session` had open,
/// or closes the list if it was already showing.
///
/// # Errors
/// Never fails for a fresh builder.
pub fn item_images_button_component(
    images_list: Component,
    session: PanelSession,
) -> Result<ComponentBuilder, ComponentError> {
    let builder = component();
    builder
        .properties(properties! {
            "text" => HostValue::Null,
            "item_id" => HostValue::Null,
        })?
        .factory(move |context| {
            let ImagesButtonProperties { text, item_id } = ImagesButtonProperties::from_properties(context.properties())?;
            let document = context.document().clone();
            let button = element(&document, "button", &[], Some(&text))?;
            context.append(button)?;

            let toggle = Rc::new(PanelToggle {
                document: document.clone(),
                item_id,
                images_list: images_list.clone(),
                session: session.clone(),
            });
            let on_click = Rc::clone(&toggle);
            document.add_node_listener(button, "click", move |_host, _event| on_click.toggle())?;
            context.add_action("toggle", move || toggle.toggle());
            Ok(())
        })?;
    Ok(builder)
}
