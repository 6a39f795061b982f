//! Built components and the instances they produce.

use std::rc::Rc;

use anyhow::Result;
use dom::{Document, HostFunction, HostValue, NodeId};
use log::{debug, trace};

use crate::context::{Callbacks, Command, FactoryContext};
use crate::error::ComponentError;
use crate::properties::Properties;

/// Signature of a component factory.
pub type FactoryFn = dyn Fn(&mut FactoryContext<'_>) -> Result<()>;

/// The frozen configuration behind a [`Component`].
pub struct ComponentDefinition {
    property_defaults: Properties,
    isolated: bool,
    factory: Rc<FactoryFn>,
}

impl ComponentDefinition {
    pub(crate) fn new(property_defaults: Properties, isolated: bool, factory: Rc<FactoryFn>) -> Self {
        Self {
            property_defaults,
            isolated,
            factory,
        }
    }

    /// Declared properties and their defaults.
    pub const fn property_defaults(&self) -> &Properties {
        &self.property_defaults
    }

    /// Whether instances mount into an isolated sub-tree.
    pub const fn isolated(&self) -> bool {
        self.isolated
    }
}

/// A built component. Cheap to clone; clones share identity.
#[derive(Clone)]
pub struct Component {
    definition: Rc<ComponentDefinition>,
}

impl Component {
    pub(crate) fn new(definition: ComponentDefinition) -> Self {
        Self {
            definition: Rc::new(definition),
        }
    }

    /// The frozen definition.
    pub fn definition(&self) -> &ComponentDefinition {
        &self.definition
    }

    /// Returns true if both handles are the same built component.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.definition, &other.definition)
    }

    /// Invoke the component with every property at its default.
    ///
    /// # Errors
    /// See [`Component::call`].
    pub fn instantiate(&self, document: &Document) -> Result<ComponentInstance> {
        self.call(document, Properties::new())
    }

    /// Create a new instance.
    ///
    /// `properties` overwrite the declared defaults key by key. The factory runs
    /// synchronously against a fresh detached fragment.
    ///
    /// # Errors
    /// [`ComponentError::UnknownProperty`] for an undeclared key; otherwise the
    /// factory's own error, unmodified.
    pub fn call(&self, document: &Document, properties: Properties) -> Result<ComponentInstance> {
        let defaults = &self.definition.property_defaults;
        if let Some(name) = properties
            .keys()
            .into_iter()
            .find(|name| !defaults.contains_key(name))
        {
            return Err(ComponentError::UnknownProperty { name }.into());
        }
        let mut merged = defaults.clone();
        merged.merge(properties);

        let fragment = document.create_fragment();
        let mut callbacks = Callbacks::default();
        {
            let mut context = FactoryContext::new(document, fragment, &merged, &mut callbacks);
            (self.definition.factory)(&mut context)?;
        }
        let elements = document.children(fragment);
        trace!(
            "component produced {} nodes and callbacks {:?}",
            elements.len(),
            callbacks.names()
        );
        Ok(ComponentInstance {
            document: document.clone(),
            rendering_root: fragment,
            elements,
            properties: merged,
            callbacks,
        })
    }
}

/// One invocation's result: the rendered nodes and their callbacks.
#[derive(Clone)]
pub struct ComponentInstance {
    document: Document,
    rendering_root: NodeId,
    elements: Vec<NodeId>,
    properties: Properties,
    callbacks: Callbacks,
}

impl ComponentInstance {
    /// The fragment the factory rendered into.
    pub const fn rendering_root(&self) -> NodeId {
        self.rendering_root
    }

    /// Top-level nodes produced by the factory.
    pub fn elements(&self) -> &[NodeId] {
        &self.elements
    }

    /// The merged properties this instance was created with.
    pub const fn properties(&self) -> &Properties {
        &self.properties
    }

    /// The callback registry.
    pub const fn callbacks(&self) -> &Callbacks {
        &self.callbacks
    }

    /// A callback by name.
    pub fn callback(&self, name: &str) -> Option<&HostFunction> {
        self.callbacks.get(name)
    }

    /// Append every top-level node to `parent`.
    ///
    /// # Errors
    /// See [`Document::append_child`].
    pub fn append_self(&self, parent: NodeId) -> Result<()> {
        debug!("mounting {} nodes into {parent:?}", self.elements.len());
        self.document.append_children(parent, &self.elements)
    }

    /// Detach every top-level node from wherever it is.
    pub fn remove_self(&self) {
        for element in &self.elements {
            self.document.remove(*element);
        }
    }

    /// Concatenated text of the top-level nodes.
    pub fn text_content(&self) -> String {
        self.elements
            .iter()
            .map(|element| self.document.text_content(*element))
            .collect()
    }

    /// Invoke a callback by name.
    ///
    /// # Errors
    /// [`ComponentError::MissingCallback`] if no such callback exists, otherwise
    /// whatever the callback returns.
    pub fn invoke(&self, name: &str, arguments: Vec<HostValue>) -> Result<HostValue> {
        let callback = self
            .callbacks
            .get(name)
            .ok_or_else(|| ComponentError::MissingCallback { name: name.to_owned() })?;
        callback.call(arguments)
    }

    /// Invoke the callback a command targets.
    ///
    /// # Errors
    /// See [`ComponentInstance::invoke`].
    pub fn dispatch<C: Command>(&self, command: C) -> Result<HostValue> {
        let name = command.name();
        self.invoke(name, command.into_arguments())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{component, properties};
    use anyhow::anyhow;

    /// Tests that undeclared keys are rejected before the factory runs
    #[test]
    fn test_unknown_property() -> Result<()> {
        let document = Document::new();
        let builder = component();
        builder.properties(properties! { "text" => "Go" })?;
        let result = builder.build().call(&document, properties! { "colour" => "red" });
        let error = result.err().and_then(|error| error.downcast::<ComponentError>().ok());
        assert_eq!(
            error,
            Some(ComponentError::UnknownProperty {
                name: "colour".to_owned()
            })
        );
        Ok(())
    }

    /// Tests that a factory error arrives unchanged
    #[test]
    fn test_factory_error_is_verbatim() -> Result<()> {
        let document = Document::new();
        let builder = component();
        builder.factory(|_context| Err(anyhow!("factory exploded")))?;
        let error = builder.build().instantiate(&document).err();
        assert_eq!(error.map(|error| format!("{error:#}")), Some("factory exploded".to_owned()));
        Ok(())
    }

    /// Tests that a builder without a factory renders nothing
    #[test]
    fn test_empty_factory() -> Result<()> {
        let document = Document::new();
        let instance = component().build().instantiate(&document)?;
        assert!(instance.elements().is_empty());
        assert!(instance.callbacks().is_empty());
        Ok(())
    }

    /// Tests that each invocation gets its own root, nodes and callbacks
    #[test]
    fn test_instances_are_independent() -> Result<()> {
        let document = Document::new();
        let builder = component();
        builder
            .properties(properties! { "text" => "a" })?
            .factory(|context| {
                let paragraph = context.document().create_element("p");
                let text = context.properties().require_str("text")?.to_owned();
                context.document().set_text_content(paragraph, &text)?;
                context.append(paragraph)?;
                let document = context.document().clone();
                context.add_callback("set_text", move |arguments| {
                    let text = arguments.first().map(ToString::to_string).unwrap_or_default();
                    document.set_text_content(paragraph, &text)?;
                    Ok(HostValue::Undefined)
                });
                Ok(())
            })?;
        let built = builder.build();
        let first = built.instantiate(&document)?;
        let second = built.call(&document, properties! { "text" => "b" })?;

        assert_ne!(first.rendering_root(), second.rendering_root());
        assert_ne!(first.elements(), second.elements());
        first.invoke("set_text", vec!["changed".into()])?;
        assert_eq!(first.text_content(), "changed");
        assert_eq!(second.text_content(), "b");
        assert_eq!(first.properties().get_str("text"), Some("a"));
        assert!(first.invoke("missing", Vec::new()).is_err());
        Ok(())
    }

    /// Tests that later registrations under one name win
    #[test]
    fn test_callback_overwrite() -> Result<()> {
        let document = Document::new();
        let builder = component();
        builder.factory(|context| {
            context.add_callback("value", |_arguments| Ok(HostValue::Number(1.0)));
            context.add_callback("value", |_arguments| Ok(HostValue::Number(2.0)));
            Ok(())
        })?;
        let instance = builder.build().instantiate(&document)?;
        assert_eq!(instance.invoke("value", Vec::new())?, HostValue::Number(2.0));
        Ok(())
    }
}
