//! Component builder.
//!
//! A builder accumulates property defaults, the isolation flag and the factory.
//! The first call to [`ComponentBuilder::build`] freezes the configuration;
//! later calls hand back the very same [`Component`].

use core::cell::{OnceCell, RefCell};
use std::rc::Rc;

use anyhow::Result;
use dom::{DefineOptions, Document};
use log::debug;

use crate::context::FactoryContext;
use crate::element::ComponentElementClass;
use crate::error::ComponentError;
use crate::instance::{Component, ComponentDefinition, FactoryFn};
use crate::properties::Properties;

#[derive(Default)]
struct PendingDefinition {
    property_defaults: Properties,
    isolated: bool,
    factory: Option<Rc<FactoryFn>>,
}

#[derive(Default)]
struct BuilderInner {
    pending: RefCell<PendingDefinition>,
    built: OnceCell<Component>,
}

/// Accumulates the configuration of one component definition.
///
/// Cloning shares the same pending configuration and the same built component.
#[derive(Clone, Default)]
pub struct ComponentBuilder {
    inner: Rc<BuilderInner>,
}

/// Start a new component definition.
pub fn component() -> ComponentBuilder {
    ComponentBuilder::new()
}

impl ComponentBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_pending(&self, operation: &'static str) -> Result<(), ComponentError> {
        if self.is_frozen() {
            return Err(ComponentError::ConfigurationFrozen { operation });
        }
        Ok(())
    }

    /// Merge property defaults; entries of `partial` overwrite existing ones.
    ///
    /// # Errors
    /// [`ComponentError::ConfigurationFrozen`] after [`ComponentBuilder::build`].
    pub fn properties(&self, partial: Properties) -> Result<&Self, ComponentError> {
        self.ensure_pending("properties")?;
        self.inner.pending.borrow_mut().property_defaults.merge(partial);
        Ok(self)
    }

    /// Mount into an isolated sub-tree instead of the host element.
    ///
    /// # Errors
    /// [`ComponentError::ConfigurationFrozen`] after [`ComponentBuilder::build`].
    pub fn shadowed(&self, enabled: bool) -> Result<&Self, ComponentError> {
        self.ensure_pending("shadowed")?;
        self.inner.pending.borrow_mut().isolated = enabled;
        Ok(self)
    }

    /// Set the factory.
    ///
    /// # Errors
    /// [`ComponentError::ConfigurationFrozen`] after [`ComponentBuilder::build`].
    pub fn factory<F>(&self, factory: F) -> Result<&Self, ComponentError>
    where
        F: Fn(&mut FactoryContext<'_>) -> Result<()> + 'static,
    {
        self.ensure_pending("factory")?;
        self.inner.pending.borrow_mut().factory = Some(Rc::new(factory));
        Ok(self)
    }

    /// Register a custom element class for this definition. The component is
    /// built lazily, on the first connection of such an element.
    ///
    /// # Errors
    /// Propagates registry errors (invalid or duplicate tag name) and errors
    /// raised while upgrading elements already in the document.
    pub fn define(&self, document: &Document, tag_name: &str, options: DefineOptions) -> Result<()> {
        debug!("registering <{tag_name}>");
        document.define(tag_name, Rc::new(ComponentElementClass::new(self.clone())), options)
    }

    /// Freeze the configuration and return the component. Repeated calls return
    /// the identical component.
    pub fn build(&self) -> Component {
        self.inner
            .built
            .get_or_init(|| {
                let pending = self.inner.pending.borrow();
                let factory = pending
                    .factory
                    .as_ref()
                    .map_or_else(|| -> Rc<FactoryFn> { Rc::new(|_context| Ok(())) }, Rc::clone);
                debug!(
                    "building component with properties {:?}",
                    pending.property_defaults.keys()
                );
                Component::new(ComponentDefinition::new(
                    pending.property_defaults.clone(),
                    pending.isolated,
                    factory,
                ))
            })
            .clone()
    }

    /// Whether [`ComponentBuilder::build`] has been called.
    pub fn is_frozen(&self) -> bool {
        self.inner.built.get().is_some()
    }

    /// Names of the declared properties, sorted.
    pub fn property_keys(&self) -> Vec<String> {
        self.inner.built.get().map_or_else(
            || self.inner.pending.borrow().property_defaults.keys(),
            |built| built.definition().property_defaults().keys(),
        )
    }
}
