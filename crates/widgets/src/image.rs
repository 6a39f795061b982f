//! Item image records.

use anyhow::Result;
use component::{ComponentError, Properties};
use dom::HostValue;
use fetch::FetchConfig;
use serde::{Deserialize, Serialize};
use url::Url;

/// One image attached to an inventory item, as returned by the API.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemImage {
    pub id: String,
    pub item_id: String,
    pub alt_text: String,
    pub priority: i64,
    pub original_file_name: String,
}

impl ItemImage {
    /// Where the uploaded file is served:
    /// `<base>/volatile/images/<item_id>_<id>_<original_file_name>`.
    ///
    /// # Errors
    /// Fails if the base URL cannot carry a path.
    pub fn image_uri(&self, config: &FetchConfig) -> Result<Url> {
        let file = format!("{}_{}_{}", self.item_id, self.id, self.original_file_name);
        config.static_file(&["volatile", "images", &file])
    }

    /// The ` [alt text]` label, empty without alt text.
    pub fn alt_label(&self) -> String {
        if self.alt_text.is_empty() {
            String::new()
        } else {
            format!(" [{}]", self.alt_text)
        }
    }

    /// Encode as a property value.
    ///
    /// # Errors
    /// Fails only if serialization fails.
    pub fn to_property(&self) -> Result<HostValue> {
        Ok(HostValue::Json(serde_json::to_value(self)?))
    }

    /// Decode the named property.
    ///
    /// # Errors
    /// Fails if the property is missing or not an image record.
    pub fn from_property(properties: &Properties, name: &str) -> Result<Self, ComponentError> {
        properties.decode(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Tests decoding and the derived URI and label
    #[test]
    fn test_image_record() -> Result<()> {
        let image: ItemImage = serde_json::from_value(json!({
            "id": "7",
            "item_id": "42",
            "alt_text": "front",
            "priority": 1,
            "original_file_name": "lamp.png",
        }))?;
        assert_eq!(
            image.image_uri(&FetchConfig::default())?.as_str(),
            "https://127.0.0.1:1443/volatile/images/42_7_lamp.png"
        );
        assert_eq!(image.alt_label(), " [front]");
        let untitled = ItemImage {
            alt_text: String::new(),
            ..image
        };
        assert_eq!(untitled.alt_label(), "");
        Ok(())
    }
}
