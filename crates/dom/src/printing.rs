use core::fmt::Write as _;

use indextree::NodeId;

use crate::tree::{Document, NodeKind};

const VOID_ELEMENTS: [&str; 8] = ["area", "br", "col", "hr", "img", "input", "link", "meta"];

fn escape_text(text: &str, out: &mut String) {
    for character in text.chars() {
        match character {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            other => out.push(other),
        }
    }
}

fn escape_attr(value: &str, out: &mut String) {
    for character in value.chars() {
        match character {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
}

fn write_node(document: &Document, node: NodeId, out: &mut String) {
    match document.kind(node) {
        Ok(NodeKind::Text { text }) => escape_text(&text, out),
        Ok(NodeKind::Element { tag }) => {
            let _ = write!(out, "<{tag}");
            for (name, value) in document.attributes(node) {
                let _ = write!(out, " {name}=\"");
                escape_attr(&value, out);
                out.push('"');
            }
            out.push('>');
            if VOID_ELEMENTS.contains(&tag.as_str()) {
                return;
            }
            write_children(document, node, out);
            let _ = write!(out, "</{tag}>");
        }
        Ok(NodeKind::Document | NodeKind::Fragment | NodeKind::ShadowRoot { .. }) => {
            write_children(document, node, out);
        }
        Err(_) => {}
    }
}

fn write_children(document: &Document, node: NodeId, out: &mut String) {
    for child in document.children(node) {
        write_node(document, child, out);
    }
}

impl Document {
    /// Serialize a node and its light-tree descendants.
    pub fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        write_node(self, node, &mut out);
        out
    }

    /// Serialize the light-tree children of a node.
    pub fn inner_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        write_children(self, node, &mut out);
        out
    }
}
