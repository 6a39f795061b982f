//! Host platform model for component runtimes.
//!
//! This crate provides the pieces a component runtime needs from its host: a
//! node tree with detached fragments, string attributes, element members,
//! event dispatch, and a custom element registry with connection and
//! attribute-change reactions. Everything is single-threaded; a [`Document`]
//! is a cheap `Rc` handle.

pub mod events;
pub mod parser;
mod printing;
pub mod registry;
pub mod tree;
pub mod value;

pub use events::{Event, Listener};
pub use indextree::NodeId;
pub use registry::{
    AttributeChange, CustomElementCallbacks, CustomElementClass, DefineOptions, is_valid_custom_element_name,
};
pub use tree::{Document, NodeKind, SelectedFile};
pub use value::{DomError, HostFn, HostFunction, HostValue};
