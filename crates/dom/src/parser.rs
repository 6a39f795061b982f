//! Markup to fragment conversion.
//!
//! Uses html5ever for parsing, then walks the resulting rcdom body and rebuilds
//! it through the regular tree operations so custom elements get constructed.

use anyhow::Result;
use html5ever::tendril::TendrilSink as _;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::{ParseOpts, parse_document};
use indextree::NodeId;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use crate::tree::Document;

fn find_body(handle: &Handle) -> Option<Handle> {
    if let NodeData::Element { name, .. } = &handle.data
        && &*name.local == "body"
    {
        return Some(Handle::clone(handle));
    }
    handle.children.borrow().iter().find_map(find_body)
}

fn walk_tree(document: &Document, handle: &Handle, parent: NodeId, top_level: bool) -> Result<()> {
    match &handle.data {
        NodeData::Element { name, attrs, .. } => {
            let element = document.create_element(&name.local);
            let attributes: Vec<(String, String)> = attrs
                .borrow()
                .iter()
                .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
                .collect();
            for (attr_name, attr_value) in &attributes {
                document.set_attribute(element, attr_name, attr_value)?;
            }
            for child in handle.children.borrow().iter() {
                walk_tree(document, child, element, false)?;
            }
            document.append_child(parent, element)?;
        }
        NodeData::Text { contents } => {
            let text = contents.borrow().to_string();
            // Formatting whitespace between top-level nodes is dropped.
            if !(top_level && text.trim().is_empty()) {
                document.append_text(parent, &text)?;
            }
        }
        _ => {
            // Comments, doctypes and processing instructions are dropped
        }
    }
    Ok(())
}

impl Document {
    /// Parse markup into a new detached fragment.
    ///
    /// # Errors
    /// Returns an error if reading the input fails or a custom element raises
    /// during construction.
    pub fn parse_fragment(&self, html: &str) -> Result<NodeId> {
        let opts = ParseOpts {
            tree_builder: TreeBuilderOpts {
                exact_errors: false,
                scripting_enabled: false,
                ..TreeBuilderOpts::default()
            },
            ..ParseOpts::default()
        };
        let dom = parse_document(RcDom::default(), opts)
            .from_utf8()
            .read_from(&mut html.as_bytes())?;

        let fragment = self.create_fragment();
        if let Some(body) = find_body(&dom.document) {
            for child in body.children.borrow().iter() {
                walk_tree(self, child, fragment, true)?;
            }
        }
        Ok(fragment)
    }

    /// Parse markup and append it to `parent`.
    ///
    /// # Errors
    /// See [`Document::parse_fragment`] and [`Document::append_child`].
    pub fn append_html(&self, parent: NodeId, html: &str) -> Result<Vec<NodeId>> {
        let fragment = self.parse_fragment(html)?;
        let nodes = self.children(fragment);
        self.append_child(parent, fragment)?;
        Ok(nodes)
    }
}
