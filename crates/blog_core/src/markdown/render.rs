//! Document tree to HTML.
//!
//! Rendering replays the tree as a pulldown-cmark event stream and hands it
//! to the stock HTML writer, so output is deterministic and side-effect free.
//! External `http(s)` links are written by hand so they open in a new tab.

use super::node::{Container, Document, Node};
use pulldown_cmark::{html, CowStr, Event, LinkType, Tag};
use pulldown_cmark_escape::{escape_href, escape_html};
use std::fmt;

/// Renders a whole document to HTML.
pub fn render(document: &Document) -> String {
    render_nodes(document.children())
}

/// Renders one (sub)tree to HTML.
pub fn render_node(node: &Node) -> String {
    render_nodes(std::slice::from_ref(node))
}

/// Renders a sequence of sibling nodes to HTML.
pub fn render_nodes(nodes: &[Node]) -> String {
    let mut events = Vec::new();
    for node in nodes {
        push_events(node, &mut events);
    }

    let mut output = String::new();
    html::push_html(&mut output, events.into_iter());
    output
}

fn push_events(node: &Node, events: &mut Vec<Event<'static>>) {
    match node {
        Node::Leaf(leaf) => events.push(leaf.to_event()),
        Node::Container(container) => match external_link_open(container) {
            Some(open) => {
                events.push(Event::InlineHtml(CowStr::from(open)));
                push_children(container, events);
                events.push(Event::InlineHtml(CowStr::Borrowed("</a>")));
            }
            None => {
                events.push(Event::Start(container.tag().clone()));
                push_children(container, events);
                events.push(Event::End(container.tag().to_end()));
            }
        },
    }
}

fn push_children(container: &Container, events: &mut Vec<Event<'static>>) {
    for child in container.children() {
        push_events(child, events);
    }
}

/// Opening `<a>` tag with `target="_blank"` for absolute web links.
fn external_link_open(container: &Container) -> Option<String> {
    match container.tag() {
        Tag::Link {
            link_type,
            dest_url,
            title,
            ..
        } if *link_type != LinkType::Email && is_external(dest_url) => {
            write_link_open(dest_url, title).ok()
        }
        _ => None,
    }
}

fn is_external(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn write_link_open(dest_url: &str, title: &str) -> Result<String, fmt::Error> {
    let mut open = String::from("<a href=\"");
    escape_href(&mut open, dest_url)?;
    if !title.is_empty() {
        open.push_str("\" title=\"");
        escape_html(&mut open, title)?;
    }
    open.push_str("\" target=\"_blank\">");
    Ok(open)
}
