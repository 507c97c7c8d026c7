//! Title extraction from parsed documents.
//!
//! # Responsibility
//! - Detach the first top-level heading from a document.
//! - Flatten a (sub)tree into whitespace-joined plain text.
//!
//! # Invariants
//! - Only direct children of the document are candidates; nested headings
//!   (inside quotes, lists, ...) are never extracted.
//! - Extraction preserves the order of the remaining children.

use super::node::{Container, Document, Node};

/// Removes and returns the first top-level heading of `document`.
///
/// Returns `None` and leaves the document untouched when no direct child is
/// a heading.
pub fn extract_first_heading(document: &mut Document) -> Option<Container> {
    let position = document.children().iter().position(Node::is_heading)?;
    match document.children_mut().remove(position) {
        Node::Container(heading) => Some(heading),
        Node::Leaf(_) => None,
    }
}

/// Plain-text form of a node.
///
/// Leaf literals are visited in document order and joined with one space;
/// the result is trimmed. Leaves without literal text (breaks, rules) add
/// nothing.
pub fn raw_text(node: &Node) -> String {
    let mut buffer = String::new();
    collect_raw_text(node, &mut buffer);
    buffer.trim().to_string()
}

/// Plain-text form of a sequence of sibling nodes.
pub fn raw_text_of(nodes: &[Node]) -> String {
    let mut buffer = String::new();
    for node in nodes {
        collect_raw_text(node, &mut buffer);
    }
    buffer.trim().to_string()
}

fn collect_raw_text(node: &Node, buffer: &mut String) {
    match node {
        Node::Leaf(leaf) => {
            if !leaf.literal().is_empty() {
                buffer.push_str(leaf.literal());
                buffer.push(' ');
            }
        }
        Node::Container(container) => {
            for child in container.children() {
                collect_raw_text(child, buffer);
            }
        }
    }
}
