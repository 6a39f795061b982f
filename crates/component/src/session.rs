//! Mutually exclusive panels.

use core::cell::RefCell;
use std::rc::Rc;

use anyhow::Result;
use dom::NodeId;
use log::debug;

use crate::instance::ComponentInstance;

struct OpenPanel {
    key: String,
    instance: ComponentInstance,
}

/// Tracks the one panel instance currently shown in a shared container.
///
/// Clones share state, so every widget that receives a clone of the same
/// session competes for the same slot.
#[derive(Clone, Default)]
pub struct PanelSession {
    current: Rc<RefCell<Option<OpenPanel>>>,
}

impl PanelSession {
    /// Create a session with nothing open.
    pub fn new() -> Self {
        Self::default()
    }

    /// Key of the open panel.
    pub fn open_key(&self) -> Option<String> {
        self.current.borrow().as_ref().map(|panel| panel.key.clone())
    }

    /// Whether the panel opened under `key` is showing.
    pub fn is_open(&self, key: &str) -> bool {
        self.current
            .borrow()
            .as_ref()
            .is_some_and(|panel| panel.key == key)
    }

    /// Close whatever is open. Returns the key that was open.
    pub fn close(&self) -> Option<String> {
        let panel = self.current.borrow_mut().take()?;
        debug!("closing panel `{}`", panel.key);
        panel.instance.remove_self();
        Some(panel.key)
    }

    /// Show `instance` in `container` under `key`, closing the previous panel.
    ///
    /// # Errors
    /// Fails if the instance cannot be appended to `container`.
    pub fn open(&self, key: &str, container: NodeId, instance: ComponentInstance) -> Result<()> {
        self.close();
        instance.append_self(container)?;
        debug!("opened panel `{key}`");
        *self.current.borrow_mut() = Some(OpenPanel {
            key: key.to_owned(),
            instance,
        });
        Ok(())
    }

    /// Close the panel for `key` if it is showing; otherwise replace whatever
    /// is open with the instance produced by `create`.
    ///
    /// Returns the newly opened instance, or `None` when the call closed `key`.
    ///
    /// # Errors
    /// Propagates errors of `create` and of mounting.
    pub fn toggle<F>(&self, key: &str, container: NodeId, create: F) -> Result<Option<ComponentInstance>>
    where
        F: FnOnce() -> Result<ComponentInstance>,
    {
        if self.close().as_deref() == Some(key) {
            return Ok(None);
        }
        let instance = create()?;
        self.open(key, container, instance.clone())?;
        Ok(Some(instance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component;
    use dom::Document;

    fn panel(document: &Document, label: &'static str) -> Result<ComponentInstance> {
        let builder = component();
        builder.factory(move |context| {
            let node = context.document().create_text(label);
            context.append(node)
        })?;
        builder.build().instantiate(document)
    }

    /// Tests open, switch and toggle-close
    #[test]
    fn test_toggle() -> Result<()> {
        let document = Document::new();
        let container = document.create_element("div");
        document.append_child(document.root(), container)?;
        let session = PanelSession::new();
        let shared = session.clone();

        assert!(session.toggle("a", container, || panel(&document, "A"))?.is_some());
        assert_eq!(document.text_content(container), "A");
        assert!(shared.is_open("a"));

        assert!(shared.toggle("b", container, || panel(&document, "B"))?.is_some());
        assert_eq!(document.text_content(container), "B");
        assert_eq!(session.open_key().as_deref(), Some("b"));

        assert!(session.toggle("b", container, || panel(&document, "B"))?.is_none());
        assert_eq!(document.text_content(container), "");
        assert_eq!(session.open_key(), None);
        assert_eq!(session.close(), None);
        Ok(())
    }
}
