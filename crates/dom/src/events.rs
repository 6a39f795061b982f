//! Event dispatch over the composed tree.

use core::cell::Cell;
use std::rc::Rc;

use anyhow::Result;
use indextree::NodeId;
use log::trace;

use crate::tree::Document;
use crate::value::DomError;

/// Event listener signature.
pub type Listener = Rc<dyn Fn(&Document, &Event) -> Result<()>>;

/// A dispatched event. Listeners may cancel the default action and stop
/// further propagation.
#[derive(Debug)]
pub struct Event {
    kind: String,
    target: NodeId,
    submitter: Option<NodeId>,
    default_prevented: Cell<bool>,
    propagation_stopped: Cell<bool>,
}

impl Event {
    /// Create an event of `kind` aimed at `target`.
    pub fn new(kind: impl Into<String>, target: NodeId) -> Self {
        Self {
            kind: kind.into(),
            target,
            submitter: None,
            default_prevented: Cell::new(false),
            propagation_stopped: Cell::new(false),
        }
    }

    /// Attach the element that triggered a submission.
    #[must_use]
    pub const fn with_submitter(mut self, submitter: NodeId) -> Self {
        self.submitter = Some(submitter);
        self
    }

    /// Event type, e.g. `click` or `submit`.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Node the event was dispatched at.
    pub const fn target(&self) -> NodeId {
        self.target
    }

    /// Element that triggered a submission, if any.
    pub const fn submitter(&self) -> Option<NodeId> {
        self.submitter
    }

    /// Cancel the default action.
    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    /// Whether the default action was cancelled.
    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }

    /// Stop propagation to further nodes.
    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    /// Whether propagation was stopped.
    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }
}

impl Document {
    /// Add a listener on a node.
    ///
    /// # Errors
    /// Fails if the node is unknown.
    pub fn add_node_listener<F>(&self, node: NodeId, kind: &str, listener: F) -> Result<(), DomError>
    where
        F: Fn(&Self, &Event) -> Result<()> + 'static,
    {
        self.inner
            .state
            .borrow_mut()
            .data_mut(node)?
            .listeners
            .push((kind.to_owned(), Rc::new(listener)));
        Ok(())
    }

    /// Add a document-wide listener. It sees every event dispatched at a
    /// connected node once the event has bubbled up to the document.
    pub fn add_event_listener<F>(&self, kind: &str, listener: F)
    where
        F: Fn(&Self, &Event) -> Result<()> + 'static,
    {
        let root = self.root();
        if let Ok(data) = self.inner.state.borrow_mut().data_mut(root) {
            data.listeners.push((kind.to_owned(), Rc::new(listener)));
        }
    }

    /// Dispatch an event, bubbling from the target to the top of its composed
    /// tree. Returns false if a listener prevented the default action.
    ///
    /// # Errors
    /// Fails if the target is unknown; listener errors abort dispatch and are
    /// returned unchanged.
    pub fn dispatch_event(&self, event: &Event) -> Result<bool> {
        let path: Vec<(NodeId, Vec<Listener>)> = {
            let state = self.inner.state.borrow();
            state.data(event.target())?;
            let mut path = Vec::new();
            let mut current = Some(event.target());
            while let Some(node) = current {
                let listeners = state
                    .data(node)
                    .map(|data| {
                        data.listeners
                            .iter()
                            .filter(|(kind, _)| kind == event.kind())
                            .map(|(_, listener)| Rc::clone(listener))
                            .collect()
                    })
                    .unwrap_or_default();
                path.push((node, listeners));
                current = state.composed_parent(node);
            }
            path
        };
        trace!("dispatching {} at {:?}", event.kind(), event.target());
        for (_node, listeners) in path {
            for listener in listeners {
                listener(self, event)?;
            }
            if event.propagation_stopped() {
                break;
            }
        }
        Ok(!event.default_prevented())
    }

    /// Dispatch a `click` at `node`.
    ///
    /// # Errors
    /// See [`Document::dispatch_event`].
    pub fn click(&self, node: NodeId) -> Result<bool> {
        self.dispatch_event(&Event::new("click", node))
    }
}
