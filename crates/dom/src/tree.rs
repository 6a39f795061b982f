//! Document tree: node storage, tree construction and attribute access.
//!
//! A [`Document`] is a cheap, cloneable handle to one node arena. All
//! operations borrow the arena for their own duration only, so closures held by
//! component instances can capture a `Document` and mutate the tree later.

use core::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use anyhow::Result;
use bytes::Bytes;
use indextree::{Arena, Node, NodeId};
use log::trace;
use smallvec::SmallVec;

use crate::events::Listener;
use crate::registry::{ElementReactions, Reaction, Registry};
use crate::value::{DomError, HostFunction, HostValue};

/// Kind of a node and its kind-specific payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The document node; root of the connected tree.
    Document,
    /// A detached container whose children are spliced into the parent on insertion.
    Fragment,
    /// An element with a lowercase tag name.
    Element { tag: String },
    /// A text node.
    Text { text: String },
    /// An isolated sub-tree attached to a host element.
    ShadowRoot { host: NodeId },
}

/// A file picked in a file input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    /// File name as reported by the picker.
    pub name: String,
    /// File contents.
    pub bytes: Bytes,
}

impl SelectedFile {
    /// Create a selected file.
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Data stored for each node.
pub struct NodeData {
    pub kind: NodeKind,
    pub attrs: SmallVec<(String, String), 4>,
    pub(crate) shadow_root: Option<NodeId>,
    pub(crate) members: HashMap<String, HostFunction>,
    pub(crate) listeners: Vec<(String, Listener)>,
    pub(crate) files: Vec<SelectedFile>,
}

impl NodeData {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            attrs: SmallVec::new(),
            shadow_root: None,
            members: HashMap::new(),
            listeners: Vec::new(),
            files: Vec::new(),
        }
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(attr_name, _)| attr_name == name)
            .map(|(_, value)| value.as_str())
    }

    fn tag(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element { tag } => Some(tag),
            _ => None,
        }
    }
}

pub(crate) struct DomState {
    pub(crate) arena: Arena<NodeData>,
    pub(crate) root: NodeId,
}

impl DomState {
    pub(crate) fn data(&self, node: NodeId) -> Result<&NodeData, DomError> {
        self.arena
            .get(node)
            .map(Node::get)
            .ok_or(DomError::UnknownNode(node))
    }

    pub(crate) fn data_mut(&mut self, node: NodeId) -> Result<&mut NodeData, DomError> {
        self.arena
            .get_mut(node)
            .map(Node::get_mut)
            .ok_or(DomError::UnknownNode(node))
    }

    /// Root of the tree containing `node`, crossing shadow boundaries.
    pub(crate) fn composed_root(&self, node: NodeId) -> NodeId {
        let mut current = node;
        loop {
            let top = current.ancestors(&self.arena).last().unwrap_or(current);
            match self.arena.get(top).map(|entry| &entry.get().kind) {
                Some(NodeKind::ShadowRoot { host }) => current = *host,
                _ => return top,
            }
        }
    }

    pub(crate) fn is_connected(&self, node: NodeId) -> bool {
        self.composed_root(node) == self.root
    }

    /// Descendants of `node` in tree order, including `node` and the contents of
    /// any shadow roots along the way.
    pub(crate) fn composed_descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            out.push(current);
            let Some(entry) = self.arena.get(current) else {
                continue;
            };
            let mut next: Vec<NodeId> = current.children(&self.arena).collect();
            if let Some(shadow) = entry.get().shadow_root {
                next.insert(0, shadow);
            }
            stack.extend(next.into_iter().rev());
        }
        out
    }

    /// Parent in the composed tree: a shadow root's parent is its host.
    pub(crate) fn composed_parent(&self, node: NodeId) -> Option<NodeId> {
        let entry = self.arena.get(node)?;
        if let NodeKind::ShadowRoot { host } = entry.get().kind {
            return Some(host);
        }
        entry.parent()
    }
}

pub(crate) struct DocumentInner {
    pub(crate) state: RefCell<DomState>,
    pub(crate) registry: RefCell<Registry>,
    pub(crate) elements: RefCell<HashMap<NodeId, ElementReactions>>,
    pub(crate) reactions: RefCell<VecDeque<Reaction>>,
    pub(crate) processing: Cell<bool>,
}

/// Handle to a document tree and its custom element registry.
#[derive(Clone)]
pub struct Document {
    pub(crate) inner: Rc<DocumentInner>,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let root = arena.new_node(NodeData::new(NodeKind::Document));
        Self {
            inner: Rc::new(DocumentInner {
                state: RefCell::new(DomState { arena, root }),
                registry: RefCell::new(Registry::default()),
                elements: RefCell::new(HashMap::new()),
                reactions: RefCell::new(VecDeque::new()),
                processing: Cell::new(false),
            }),
        }
    }

    /// The document node.
    pub fn root(&self) -> NodeId {
        self.inner.state.borrow().root
    }

    /// Returns true if both handles refer to the same document.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn new_node(&self, kind: NodeKind) -> NodeId {
        self.inner
            .state
            .borrow_mut()
            .arena
            .new_node(NodeData::new(kind))
    }

    /// Create a detached, empty fragment.
    pub fn create_fragment(&self) -> NodeId {
        self.new_node(NodeKind::Fragment)
    }

    /// Create a detached text node.
    pub fn create_text(&self, text: impl Into<String>) -> NodeId {
        self.new_node(NodeKind::Text { text: text.into() })
    }

    /// Create a detached element. Elements whose tag is a defined custom
    /// element are constructed immediately.
    pub fn create_element(&self, tag: &str) -> NodeId {
        let node = self.new_node(NodeKind::Element {
            tag: tag.to_ascii_lowercase(),
        });
        self.construct_if_defined(node);
        node
    }

    /// Kind of a node.
    ///
    /// # Errors
    /// Fails if the node is unknown.
    pub fn kind(&self, node: NodeId) -> Result<NodeKind, DomError> {
        Ok(self.inner.state.borrow().data(node)?.kind.clone())
    }

    /// Tag name of an element, `None` for other node kinds.
    pub fn tag_name(&self, node: NodeId) -> Option<String> {
        let state = self.inner.state.borrow();
        state.data(node).ok()?.tag().map(str::to_owned)
    }

    /// Parent in the light tree.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.inner.state.borrow().arena.get(node)?.parent()
    }

    /// Children in tree order.
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        let state = self.inner.state.borrow();
        if state.arena.get(node).is_none() {
            return Vec::new();
        }
        node.children(&state.arena).collect()
    }

    /// Whether the node is reachable from the document node.
    pub fn is_connected(&self, node: NodeId) -> bool {
        self.inner.state.borrow().is_connected(node)
    }

    /// Append `child` to `parent`, detaching it from its previous parent first.
    /// A fragment child is emptied into `parent` instead.
    ///
    /// Custom elements that become connected run their lifecycle reactions
    /// before this returns.
    ///
    /// # Errors
    /// Fails on hierarchy violations, and propagates the first error raised by
    /// a lifecycle reaction.
    pub fn append_child(&self, parent: NodeId, child: NodeId) -> Result<()> {
        let inserted = {
            let mut state = self.inner.state.borrow_mut();
            match state.data(parent)?.kind {
                NodeKind::Text { .. } => {
                    return Err(DomError::Hierarchy("text nodes cannot have children".to_owned()).into());
                }
                NodeKind::Document | NodeKind::Fragment | NodeKind::Element { .. } | NodeKind::ShadowRoot { .. } => {}
            }
            let moved: Vec<NodeId> = match state.data(child)?.kind {
                NodeKind::Fragment => child.children(&state.arena).collect(),
                NodeKind::Document | NodeKind::ShadowRoot { .. } => {
                    return Err(DomError::Hierarchy("node cannot be inserted".to_owned()).into());
                }
                NodeKind::Element { .. } | NodeKind::Text { .. } => vec![child],
            };
            for node in &moved {
                if parent.ancestors(&state.arena).any(|ancestor| ancestor == *node) {
                    return Err(DomError::Hierarchy("cannot append an ancestor".to_owned()).into());
                }
            }
            for node in &moved {
                node.detach(&mut state.arena);
                parent
                    .checked_append(*node, &mut state.arena)
                    .map_err(|error| DomError::Hierarchy(format!("{error:?}")))?;
            }
            if state.is_connected(parent) {
                moved
                    .iter()
                    .flat_map(|node| state.composed_descendants(*node))
                    .collect()
            } else {
                Vec::new()
            }
        };
        for node in inserted {
            self.enqueue_connection(node);
        }
        self.process_reactions()
    }

    /// Append every node in `children` to `parent`, in order.
    ///
    /// # Errors
    /// See [`Document::append_child`].
    pub fn append_children(&self, parent: NodeId, children: &[NodeId]) -> Result<()> {
        for child in children {
            self.append_child(parent, *child)?;
        }
        Ok(())
    }

    /// Detach a node from its parent. The node stays valid and can be re-inserted.
    pub fn remove(&self, node: NodeId) {
        let mut state = self.inner.state.borrow_mut();
        if state.arena.get(node).is_some() {
            node.detach(&mut state.arena);
        }
    }

    /// Remove all children of `node`.
    pub fn clear_children(&self, node: NodeId) {
        for child in self.children(node) {
            self.remove(child);
        }
    }

    /// Replace all children of `node` with `children`.
    ///
    /// # Errors
    /// See [`Document::append_child`].
    pub fn replace_children(&self, node: NodeId, children: &[NodeId]) -> Result<()> {
        self.clear_children(node);
        self.append_children(node, children)
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, node: NodeId) -> String {
        let state = self.inner.state.borrow();
        if state.arena.get(node).is_none() {
            return String::new();
        }
        node.descendants(&state.arena)
            .filter_map(|descendant| match &state.arena.get(descendant)?.get().kind {
                NodeKind::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Replace the children of `node` with a single text node (none if empty).
    ///
    /// # Errors
    /// Fails if the node is unknown.
    pub fn set_text_content(&self, node: NodeId, text: &str) -> Result<()> {
        {
            let mut state = self.inner.state.borrow_mut();
            if let NodeKind::Text { text: current } = &mut state.data_mut(node)?.kind {
                text.clone_into(current);
                return Ok(());
            }
        }
        self.clear_children(node);
        if !text.is_empty() {
            let text_node = self.create_text(text);
            self.append_child(node, text_node)?;
        }
        Ok(())
    }

    /// Append a text node to `parent`.
    ///
    /// # Errors
    /// See [`Document::append_child`].
    pub fn append_text(&self, parent: NodeId, text: &str) -> Result<()> {
        let text_node = self.create_text(text);
        self.append_child(parent, text_node)
    }

    /// Read an attribute.
    pub fn get_attribute(&self, node: NodeId, name: &str) -> Option<String> {
        let state = self.inner.state.borrow();
        state.data(node).ok()?.attribute(name).map(str::to_owned)
    }

    /// Whether the attribute is present.
    pub fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.get_attribute(node, name).is_some()
    }

    /// All attributes in insertion order.
    pub fn attributes(&self, node: NodeId) -> Vec<(String, String)> {
        let state = self.inner.state.borrow();
        state
            .data(node)
            .map(|data| data.attrs.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Set an attribute. Observed attributes of custom elements dispatch an
    /// attribute-changed reaction.
    ///
    /// # Errors
    /// Fails if the node is unknown, and propagates reaction errors.
    pub fn set_attribute(&self, node: NodeId, name: &str, value: &str) -> Result<()> {
        let name = name.to_ascii_lowercase();
        let old_value = {
            let mut state = self.inner.state.borrow_mut();
            let data = state.data_mut(node)?;
            let slot = data.attrs.iter_mut().find(|(attr_name, _)| *attr_name == name);
            match slot {
                Some((_, current)) => Some(core::mem::replace(current, value.to_owned())),
                None => {
                    data.attrs.push((name.clone(), value.to_owned()));
                    None
                }
            }
        };
        trace!("set_attribute {name}={value:?} on {node:?}");
        self.enqueue_attribute_change(node, name, old_value, Some(value.to_owned()));
        self.process_reactions()
    }

    /// Remove an attribute. Observed attributes dispatch a reaction with no new value.
    ///
    /// # Errors
    /// Fails if the node is unknown, and propagates reaction errors.
    pub fn remove_attribute(&self, node: NodeId, name: &str) -> Result<()> {
        let name = name.to_ascii_lowercase();
        let old_value = {
            let mut state = self.inner.state.borrow_mut();
            let data = state.data_mut(node)?;
            let position = data.attrs.iter().position(|(attr_name, _)| *attr_name == name);
            position.map(|index| data.attrs.remove(index).1)
        };
        if old_value.is_none() {
            return Ok(());
        }
        self.enqueue_attribute_change(node, name, old_value, None);
        self.process_reactions()
    }

    /// Whitespace-separated class list contains `class`.
    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.get_attribute(node, "class")
            .is_some_and(|classes| classes.split_ascii_whitespace().any(|entry| entry == class))
    }

    /// Descendant elements of `root` (excluding `root`) carrying `class`, in tree order.
    pub fn elements_by_class_name(&self, root: NodeId, class: &str) -> Vec<NodeId> {
        self.descendant_elements(root)
            .into_iter()
            .filter(|node| self.has_class(*node, class))
            .collect()
    }

    /// Descendant elements of `root` (excluding `root`) with tag `tag`, in tree order.
    pub fn elements_by_tag_name(&self, root: NodeId, tag: &str) -> Vec<NodeId> {
        let tag = tag.to_ascii_lowercase();
        self.descendant_elements(root)
            .into_iter()
            .filter(|node| self.tag_name(*node).as_deref() == Some(tag.as_str()))
            .collect()
    }

    /// First descendant element with the given `id` attribute.
    pub fn element_by_id(&self, root: NodeId, id: &str) -> Option<NodeId> {
        self.descendant_elements(root)
            .into_iter()
            .find(|node| self.get_attribute(*node, "id").as_deref() == Some(id))
    }

    /// Descendant elements of `root` (excluding `root`), in tree order.
    pub fn descendant_elements(&self, root: NodeId) -> Vec<NodeId> {
        let state = self.inner.state.borrow();
        if state.arena.get(root).is_none() {
            return Vec::new();
        }
        root.descendants(&state.arena)
            .skip(1)
            .filter(|node| {
                state
                    .arena
                    .get(*node)
                    .is_some_and(|entry| entry.get().tag().is_some())
            })
            .collect()
    }

    /// Attach an isolated sub-tree to `host` and return its root.
    ///
    /// # Errors
    /// Fails if `host` is not an element or already has a shadow root.
    pub fn attach_shadow(&self, host: NodeId) -> Result<NodeId, DomError> {
        let shadow = {
            let state = self.inner.state.borrow();
            let data = state.data(host)?;
            if data.tag().is_none() {
                return Err(DomError::Hierarchy("only elements can host a shadow root".to_owned()));
            }
            if data.shadow_root.is_some() {
                return Err(DomError::ShadowRootExists(host));
            }
            drop(state);
            self.new_node(NodeKind::ShadowRoot { host })
        };
        self.inner.state.borrow_mut().data_mut(host)?.shadow_root = Some(shadow);
        Ok(shadow)
    }

    /// The shadow root attached to `host`, if any.
    pub fn shadow_root(&self, host: NodeId) -> Option<NodeId> {
        self.inner.state.borrow().data(host).ok()?.shadow_root
    }

    /// Expose a function as a named member of an element, replacing any previous one.
    ///
    /// # Errors
    /// Fails if the node is unknown.
    pub fn define_member(&self, node: NodeId, name: &str, function: HostFunction) -> Result<(), DomError> {
        self.inner
            .state
            .borrow_mut()
            .data_mut(node)?
            .members
            .insert(name.to_owned(), function);
        Ok(())
    }

    /// Look up a member function.
    pub fn member(&self, node: NodeId, name: &str) -> Option<HostFunction> {
        self.inner.state.borrow().data(node).ok()?.members.get(name).cloned()
    }

    /// Names of all members of an element, sorted.
    pub fn member_names(&self, node: NodeId) -> Vec<String> {
        let state = self.inner.state.borrow();
        let mut names: Vec<String> = state
            .data(node)
            .map(|data| data.members.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    /// Invoke a member function.
    ///
    /// # Errors
    /// Fails with [`DomError::UnknownMember`] if absent, otherwise propagates the
    /// member's own error unchanged.
    pub fn call_member(&self, node: NodeId, name: &str, arguments: Vec<HostValue>) -> Result<HostValue> {
        let function = self
            .member(node, name)
            .ok_or_else(|| DomError::UnknownMember(name.to_owned()))?;
        function.call(arguments)
    }

    /// Set the selected files of a file input.
    ///
    /// # Errors
    /// Fails if the node is unknown.
    pub fn set_files(&self, node: NodeId, files: Vec<SelectedFile>) -> Result<(), DomError> {
        self.inner.state.borrow_mut().data_mut(node)?.files = files;
        Ok(())
    }

    /// Selected files of a file input.
    pub fn files(&self, node: NodeId) -> Vec<SelectedFile> {
        self.inner
            .state
            .borrow()
            .data(node)
            .map(|data| data.files.clone())
            .unwrap_or_default()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
