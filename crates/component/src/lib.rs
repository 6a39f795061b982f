//! Declarative component definitions over the `dom` host model.
//!
//! A [`ComponentBuilder`] collects property defaults, an isolation flag and a
//! factory. Building freezes it into a [`Component`]; every call produces a fresh
//! [`ComponentInstance`]. A builder can also be registered as a custom element,
//! in which case attributes feed the properties and attribute changes reach the
//! instance's `set_<attribute>` callbacks.

pub mod builder;
pub mod context;
pub mod element;
pub mod error;
pub mod instance;
pub mod properties;
pub mod session;

pub use builder::{ComponentBuilder, component};
pub use context::{Callbacks, Command, FactoryContext};
pub use element::{ComponentElement, ComponentElementClass, ElementBinding, ElementState, collect_properties, setter_name};
pub use error::ComponentError;
pub use instance::{Component, ComponentDefinition, ComponentInstance, FactoryFn};
pub use properties::{FromProperties, Properties};
pub use session::PanelSession;
