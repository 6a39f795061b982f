//! Item-image widgets.
//!
//! An inventory item can carry images. [`ItemImageWidgets`] wires the family
//! together: the images list renders one list item per image plus an upload
//! form, and the `x-item-images-button` custom element toggles the list in the
//! page's `.right` panel.

pub mod command;
mod helpers;
pub mod image;
pub mod images_button;
pub mod images_list;
pub mod list_item;
pub mod upload_form;

use anyhow::Result;
use component::{Component, ComponentBuilder, ComponentError, PanelSession};
use dom::{DefineOptions, Document};
use fetch::Client;
use forms::form_response_component;

pub use command::ItemImagesCommand;
pub use image::ItemImage;
pub use images_button::{ITEM_IMAGES_BUTTON_TAG, PANEL_CLASS, item_images_button_component};
pub use images_list::item_images_list_component;
pub use list_item::item_image_list_item_component;
pub use upload_form::item_image_upload_form_component;

/// The built components of the item-image family, sharing one client.
#[derive(Clone)]
pub struct ItemImageWidgets {
    response_widget: Component,
    list_item: Component,
    upload_form: Component,
    images_list: Component,
}

impl ItemImageWidgets {
    /// Build every component of the family.
    ///
    /// # Errors
    /// Never fails for fresh builders.
    pub fn new(client: &Client) -> Result<Self, ComponentError> {
        let response_widget = form_response_component()?;
        let list_item = item_image_list_item_component(client, response_widget.clone())?;
        let upload_form = item_image_upload_form_component(client, response_widget.clone())?;
        let images_list = item_images_list_component(client, list_item.clone(), upload_form.clone())?;
        Ok(Self {
            response_widget,
            list_item,
            upload_form,
            images_list,
        })
    }

    /// The status widget shared by deletions and uploads.
    pub const fn response_widget(&self) -> &Component {
        &self.response_widget
    }

    /// One entry of the images list.
    pub const fn list_item(&self) -> &Component {
        &self.list_item
    }

    /// The upload form.
    pub const fn upload_form(&self) -> &Component {
        &self.upload_form
    }

    /// The images list with its upload form.
    pub const fn images_list(&self) -> &Component {
        &self.images_list
    }

    /// Register `x-item-images-button` in `document`. Buttons sharing
    /// `session` keep at most one images panel open.
    ///
    /// # Errors
    /// Fails if the tag is already defined, or if upgrading buttons already in
    /// the document fails.
    pub fn define_images_button(&self, document: &Document, session: PanelSession) -> Result<ComponentBuilder> {
        let builder = item_images_button_component(self.images_list.clone(), session)?;
        builder.define(document, ITEM_IMAGES_BUTTON_TAG, DefineOptions::default())?;
        Ok(builder)
    }
}
