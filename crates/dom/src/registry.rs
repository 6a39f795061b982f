//! Custom element registry and lifecycle reactions.
//!
//! Definitions map a tag name to a [`CustomElementClass`]. Each element of a
//! defined tag gets its own [`CustomElementCallbacks`] object, constructed when
//! the element is created (or upgraded when the tag is defined later). Lifecycle
//! reactions are queued on the document and drained one at a time: a reaction
//! raised while another one runs waits until the running one has completed.

use core::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use anyhow::{Error, Result};
use indextree::NodeId;
use log::{debug, error};

use crate::tree::Document;
use crate::value::DomError;

/// Options passed to [`Document::define`], stored verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefineOptions {
    /// Name of a built-in element this definition customizes.
    pub extends: Option<String>,
}

/// A registered element class.
pub trait CustomElementClass {
    /// Attribute names whose changes are reported to the element.
    fn observed_attributes(&self) -> Vec<String>;

    /// Construct the per-element callback object.
    fn construct(&self, document: &Document, element: NodeId) -> Box<dyn CustomElementCallbacks>;
}

/// One attribute change as reported to an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeChange {
    /// Attribute name (lowercase).
    pub name: String,
    /// Previous value, `None` if the attribute was absent.
    pub old_value: Option<String>,
    /// New value, `None` if the attribute was removed.
    pub new_value: Option<String>,
}

/// Per-element lifecycle hooks.
pub trait CustomElementCallbacks {
    /// The element became connected to the document.
    ///
    /// # Errors
    /// Errors are propagated to the operation that connected the element.
    fn connected(&mut self, document: &Document, element: NodeId) -> Result<()>;

    /// An observed attribute was set or removed.
    ///
    /// # Errors
    /// Errors are propagated to the operation that changed the attribute.
    fn attribute_changed(&mut self, document: &Document, element: NodeId, change: &AttributeChange) -> Result<()>;
}

struct Definition {
    class: Rc<dyn CustomElementClass>,
    options: DefineOptions,
}

#[derive(Default)]
pub(crate) struct Registry {
    definitions: HashMap<String, Definition>,
}

pub(crate) type ElementReactions = Rc<RefCell<Box<dyn CustomElementCallbacks>>>;

pub(crate) enum Reaction {
    Connected { element: NodeId },
    AttributeChanged { element: NodeId, change: AttributeChange },
}

/// Valid custom element names start with an ASCII lowercase letter, contain a
/// hyphen, and contain no ASCII uppercase letters.
pub fn is_valid_custom_element_name(name: &str) -> bool {
    const RESERVED: [&str; 8] = [
        "annotation-xml",
        "color-profile",
        "font-face",
        "font-face-src",
        "font-face-uri",
        "font-face-format",
        "font-face-name",
        "missing-glyph",
    ];
    name.starts_with(|first: char| first.is_ascii_lowercase())
        && name.contains('-')
        && !name.chars().any(|character| character.is_ascii_uppercase() || character.is_whitespace())
        && !RESERVED.contains(&name)
}

impl Document {
    /// Register a custom element class under `name`. Elements of that tag that
    /// are already connected are upgraded immediately.
    ///
    /// # Errors
    /// Fails on invalid or duplicate names, and propagates errors raised while
    /// upgrading existing elements.
    pub fn define(&self, name: &str, class: Rc<dyn CustomElementClass>, options: DefineOptions) -> Result<()> {
        if !is_valid_custom_element_name(name) {
            return Err(DomError::InvalidCustomElementName(name.to_owned()).into());
        }
        {
            let mut registry = self.inner.registry.borrow_mut();
            if registry.definitions.contains_key(name) {
                return Err(DomError::AlreadyDefined(name.to_owned()).into());
            }
            registry
                .definitions
                .insert(name.to_owned(), Definition { class, options });
        }
        debug!("defined custom element <{name}>");

        let pending: Vec<NodeId> = {
            let state = self.inner.state.borrow();
            state
                .composed_descendants(state.root)
                .into_iter()
                .filter(|node| self.tag_name(*node).as_deref() == Some(name))
                .collect()
        };
        for node in pending {
            self.enqueue_connection(node);
        }
        self.process_reactions()
    }

    /// Whether a tag name is defined.
    pub fn is_defined(&self, name: &str) -> bool {
        self.inner.registry.borrow().definitions.contains_key(name)
    }

    /// The options a tag name was defined with.
    pub fn define_options(&self, name: &str) -> Option<DefineOptions> {
        self.inner
            .registry
            .borrow()
            .definitions
            .get(name)
            .map(|definition| definition.options.clone())
    }

    /// Observed attributes of the class registered for `name`.
    pub fn observed_attributes(&self, name: &str) -> Vec<String> {
        self.class_for(name)
            .map(|class| class.observed_attributes())
            .unwrap_or_default()
    }

    /// Whether the element has been constructed as a custom element.
    pub fn is_custom(&self, element: NodeId) -> bool {
        self.inner.elements.borrow().contains_key(&element)
    }

    fn class_for(&self, name: &str) -> Option<Rc<dyn CustomElementClass>> {
        self.inner
            .registry
            .borrow()
            .definitions
            .get(name)
            .map(|definition| Rc::clone(&definition.class))
    }

    /// Construct the callback object for `node` if its tag is defined and it
    /// has not been constructed yet. Returns true if a construction happened.
    pub(crate) fn construct_if_defined(&self, node: NodeId) -> bool {
        if self.is_custom(node) {
            return false;
        }
        let Some(tag) = self.tag_name(node) else {
            return false;
        };
        let Some(class) = self.class_for(&tag) else {
            return false;
        };
        let callbacks = class.construct(self, node);
        self.inner
            .elements
            .borrow_mut()
            .insert(node, Rc::new(RefCell::new(callbacks)));
        debug!("constructed <{tag}> for {node:?}");
        true
    }

    /// Queue the reactions for a node that just became connected. Upgrades
    /// report every observed attribute already present before connecting.
    pub(crate) fn enqueue_connection(&self, node: NodeId) {
        if self.construct_if_defined(node) {
            let observed = self
                .tag_name(node)
                .map(|tag| self.observed_attributes(&tag))
                .unwrap_or_default();
            for (name, value) in self.attributes(node) {
                if observed.contains(&name) {
                    self.inner.reactions.borrow_mut().push_back(Reaction::AttributeChanged {
                        element: node,
                        change: AttributeChange {
                            name,
                            old_value: None,
                            new_value: Some(value),
                        },
                    });
                }
            }
        }
        if self.is_custom(node) {
            self.inner
                .reactions
                .borrow_mut()
                .push_back(Reaction::Connected { element: node });
        }
    }

    pub(crate) fn enqueue_attribute_change(
        &self,
        node: NodeId,
        name: String,
        old_value: Option<String>,
        new_value: Option<String>,
    ) {
        if !self.is_custom(node) {
            return;
        }
        let Some(tag) = self.tag_name(node) else {
            return;
        };
        if !self.observed_attributes(&tag).contains(&name) {
            return;
        }
        self.inner.reactions.borrow_mut().push_back(Reaction::AttributeChanged {
            element: node,
            change: AttributeChange {
                name,
                old_value,
                new_value,
            },
        });
    }

    /// Drain queued reactions in order. Nested calls return immediately; the
    /// outermost drain runs everything. Every reaction runs even if an earlier
    /// one failed; the first error is returned.
    pub(crate) fn process_reactions(&self) -> Result<()> {
        if self.inner.processing.replace(true) {
            return Ok(());
        }
        let mut first_error: Option<Error> = None;
        loop {
            let next = self.inner.reactions.borrow_mut().pop_front();
            let Some(reaction) = next else {
                break;
            };
            if let Err(reaction_error) = self.run_reaction(reaction) {
                if first_error.is_some() {
                    error!("custom element reaction failed: {reaction_error:#}");
                } else {
                    first_error = Some(reaction_error);
                }
            }
        }
        self.inner.processing.set(false);
        first_error.map_or(Ok(()), Err)
    }

    fn run_reaction(&self, reaction: Reaction) -> Result<()> {
        let element = match &reaction {
            Reaction::Connected { element } | Reaction::AttributeChanged { element, .. } => *element,
        };
        let Some(callbacks) = self.inner.elements.borrow().get(&element).map(Rc::clone) else {
            return Ok(());
        };
        let mut callbacks = callbacks.borrow_mut();
        match reaction {
            Reaction::Connected { element: node } => callbacks.connected(self, node),
            Reaction::AttributeChanged { element: node, change } => {
                callbacks.attribute_changed(self, node, &change)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tests custom element name validation
    #[test]
    fn test_valid_names() {
        assert!(is_valid_custom_element_name("x-widget"));
        assert!(is_valid_custom_element_name("x-item-images-button"));
        assert!(!is_valid_custom_element_name("widget"));
        assert!(!is_valid_custom_element_name("X-widget"));
        assert!(!is_valid_custom_element_name("x-Widget"));
        assert!(!is_valid_custom_element_name("1-widget"));
        assert!(!is_valid_custom_element_name("font-face"));
    }
}
