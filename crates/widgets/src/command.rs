//! Widget commands.

use component::Command;
use dom::HostValue;

/// Commands understood by the item-image widget family.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemImagesCommand {
    /// Reload the images list.
    Fetch,
    /// Delete the image shown by a list item.
    Delete,
    /// Validate and send the upload form.
    Upload,
    /// Open or close the images panel of a button.
    Toggle,
}

impl Command for ItemImagesCommand {
    fn name(&self) -> &'static str {
        match self {
            Self::Fetch => "fetch",
            Self::Delete => "delete",
            Self::Upload => "upload",
            Self::Toggle => "toggle",
        }
    }

    fn into_arguments(self) -> Vec<HostValue> {
        Vec::new()
    }
}
