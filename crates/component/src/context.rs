//! Factory context and per-instance callback registry.

use std::collections::HashMap;
use std::collections::hash_map::Iter;

use anyhow::Result;
use dom::{Document, HostFunction, HostValue, NodeId};

/// Per-instance mapping from callback name to closure.
#[derive(Clone, Debug, Default)]
pub struct Callbacks(HashMap<String, HostFunction>);

impl Callbacks {
    /// Register a callback; a later registration under the same name wins.
    pub fn insert(&mut self, name: impl Into<String>, callback: HostFunction) {
        self.0.insert(name.into(), callback);
    }

    /// Look up a callback.
    pub fn get(&self, name: &str) -> Option<&HostFunction> {
        self.0.get(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.0.keys().cloned().collect();
        names.sort();
        names
    }

    /// Iterate over entries in arbitrary order.
    pub fn iter(&self) -> Iter<'_, String, HostFunction> {
        self.0.iter()
    }

    /// Number of callbacks.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no callback is registered.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A closed set of commands one component family accepts.
///
/// Each variant maps to exactly one registered callback, so dispatching through
/// a command enum is checked for exhaustiveness at compile time.
pub trait Command {
    /// Name of the callback this command targets.
    fn name(&self) -> &'static str;

    /// Arguments passed to the callback.
    fn into_arguments(self) -> Vec<HostValue>;
}

/// The view a factory receives for one invocation.
pub struct FactoryContext<'ctx> {
    document: &'ctx Document,
    fragment: NodeId,
    properties: &'ctx crate::Properties,
    callbacks: &'ctx mut Callbacks,
}

impl<'ctx> FactoryContext<'ctx> {
    pub(crate) fn new(
        document: &'ctx Document,
        fragment: NodeId,
        properties: &'ctx crate::Properties,
        callbacks: &'ctx mut Callbacks,
    ) -> Self {
        Self {
            document,
            fragment,
            properties,
            callbacks,
        }
    }

    /// Document used to build nodes.
    pub const fn document(&self) -> &'ctx Document {
        self.document
    }

    /// The fresh rendering root of this invocation.
    pub const fn fragment(&self) -> NodeId {
        self.fragment
    }

    /// Merged properties.
    pub const fn properties(&self) -> &'ctx crate::Properties {
        self.properties
    }

    /// Append a node to the rendering root.
    ///
    /// # Errors
    /// See [`Document::append_child`].
    pub fn append(&self, node: NodeId) -> Result<()> {
        self.document.append_child(self.fragment, node)
    }

    /// Register a callback for this instance.
    pub fn add_callback<F>(&mut self, name: &str, callback: F)
    where
        F: Fn(Vec<HostValue>) -> Result<HostValue> + 'static,
    {
        self.callbacks.insert(name, HostFunction::new(callback));
    }

    /// Register an already wrapped host function.
    pub fn add_function(&mut self, name: &str, function: HostFunction) {
        self.callbacks.insert(name, function);
    }

    /// Register a callback that ignores its arguments.
    pub fn add_action<F>(&mut self, name: &str, action: F)
    where
        F: Fn() -> Result<()> + 'static,
    {
        self.callbacks.insert(name, HostFunction::from_action(action));
    }
}
