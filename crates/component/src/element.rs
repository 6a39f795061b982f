//! Custom element adapter.
//!
//! The adapter is a two-state machine. The transition logic lives in
//! [`ElementState`] and [`collect_properties`] and does not touch the host; the
//! [`ComponentElement`] binding feeds it host events and applies its results.

use anyhow::Result;
use dom::{AttributeChange, CustomElementCallbacks, CustomElementClass, Document, HostFunction, HostValue, NodeId};
use log::{debug, trace};

use crate::builder::ComponentBuilder;
use crate::instance::ComponentInstance;
use crate::properties::Properties;

/// Name of the callback that receives changes of `attribute`.
pub fn setter_name(attribute: &str) -> String {
    format!("set_{attribute}")
}

/// Resolve one value per declared property: the raw attribute string when the
/// attribute is present, the declared default otherwise.
pub fn collect_properties<F>(defaults: &Properties, attribute: F) -> Properties
where
    F: Fn(&str) -> Option<String>,
{
    defaults
        .iter()
        .map(|(name, default)| {
            let value = attribute(name).map_or_else(|| default.clone(), HostValue::String);
            (name.clone(), value)
        })
        .collect()
}

/// The instance bound to one connected host element.
#[derive(Clone)]
pub struct ElementBinding {
    /// The component instance rendered for the element.
    pub instance: ComponentInstance,
    /// Where the instance's nodes were mounted.
    pub mount_point: NodeId,
}

/// Lifecycle of one host element.
#[derive(Default)]
pub enum ElementState {
    /// Created, never connected. Attribute changes are ignored.
    #[default]
    Unconnected,
    /// Connected once; holds the bound instance for the element's lifetime.
    Connected(ElementBinding),
}

impl ElementState {
    /// Whether the element has been connected.
    pub const fn is_connected(&self) -> bool {
        matches!(self, Self::Connected(_))
    }

    /// The binding, once connected.
    pub const fn binding(&self) -> Option<&ElementBinding> {
        match self {
            Self::Unconnected => None,
            Self::Connected(binding) => Some(binding),
        }
    }

    /// The setter to call for a change of `attribute`, if any.
    pub fn setter_for(&self, attribute: &str) -> Option<HostFunction> {
        self.binding()?
            .instance
            .callback(&setter_name(attribute))
            .cloned()
    }

    /// Move to `Connected` using `mount`. Returns false without calling
    /// `mount` when already connected.
    ///
    /// # Errors
    /// Propagates the error of `mount`; the state stays `Unconnected`.
    pub fn connect<F>(&mut self, mount: F) -> Result<bool>
    where
        F: FnOnce() -> Result<ElementBinding>,
    {
        if self.is_connected() {
            return Ok(false);
        }
        *self = Self::Connected(mount()?);
        Ok(true)
    }
}

/// Per-element host binding.
pub struct ComponentElement {
    builder: ComponentBuilder,
    state: ElementState,
}

impl ComponentElement {
    /// An unconnected element bound to `builder`.
    pub fn new(builder: ComponentBuilder) -> Self {
        Self {
            builder,
            state: ElementState::Unconnected,
        }
    }

    /// Current lifecycle state.
    pub const fn state(&self) -> &ElementState {
        &self.state
    }
}

fn mount(builder: &ComponentBuilder, document: &Document, element: NodeId) -> Result<ElementBinding> {
    let component = builder.build();
    let definition = component.definition();
    let properties = collect_properties(definition.property_defaults(), |name| {
        document.get_attribute(element, name)
    });
    let instance = component.call(document, properties)?;
    let mount_point = if definition.isolated() {
        document.attach_shadow(element)?
    } else {
        element
    };
    instance.append_self(mount_point)?;
    for (name, callback) in instance.callbacks().iter() {
        document.define_member(element, name, HostFunction::clone(callback))?;
    }
    Ok(ElementBinding { instance, mount_point })
}

impl CustomElementCallbacks for ComponentElement {
    fn connected(&mut self, document: &Document, element: NodeId) -> Result<()> {
        let builder = &self.builder;
        if self.state.connect(|| mount(builder, document, element))? {
            debug!("connected component element {element:?}");
        }
        Ok(())
    }

    fn attribute_changed(&mut self, _document: &Document, element: NodeId, change: &AttributeChange) -> Result<()> {
        let Some(setter) = self.state.setter_for(&change.name) else {
            trace!("no setter for `{}` on {element:?}", change.name);
            return Ok(());
        };
        setter.call(vec![HostValue::from_attribute(change.new_value.clone())])?;
        Ok(())
    }
}

/// Registry class for a component; observed attributes are the declared
/// property names.
pub struct ComponentElementClass {
    builder: ComponentBuilder,
}

impl ComponentElementClass {
    /// A class backed by `builder`.
    pub const fn new(builder: ComponentBuilder) -> Self {
        Self { builder }
    }
}

impl CustomElementClass for ComponentElementClass {
    fn observed_attributes(&self) -> Vec<String> {
        self.builder.property_keys()
    }

    fn construct(&self, _document: &Document, _element: NodeId) -> Box<dyn CustomElementCallbacks> {
        Box::new(ComponentElement::new(self.builder.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{component, properties};

    /// Tests attribute resolution against defaults
    #[test]
    fn test_collect_properties() {
        let defaults = properties! { "count" => 1.0, "label" => HostValue::Null };
        let collected = collect_properties(&defaults, |name| (name == "count").then(|| "5".to_owned()));
        assert_eq!(collected.get("count"), Some(&HostValue::String("5".to_owned())));
        assert_eq!(collected.get("label"), Some(&HostValue::Null));
        assert_eq!(collected.len(), 2);
    }

    /// Tests that connect only runs once and that failures keep the state
    #[test]
    fn test_state_transitions() -> Result<()> {
        let document = Document::new();
        let mut state = ElementState::default();
        assert!(state.setter_for("x").is_none());
        assert!(state.connect(|| Err(anyhow::anyhow!("nope"))).is_err());
        assert!(!state.is_connected());

        let builder = component();
        builder.factory(|context| {
            context.add_action("set_x", || Ok(()));
            Ok(())
        })?;
        let instance = builder.build().instantiate(&document)?;
        let root = document.root();
        assert!(state.connect(|| Ok(ElementBinding { instance, mount_point: root }))?);
        assert!(!state.connect(|| Err(anyhow::anyhow!("not called")))?);
        assert!(state.setter_for("x").is_some());
        assert!(state.setter_for("y").is_none());
        Ok(())
    }
}
