//! Markdown source to document tree.
//!
//! # Responsibility
//! - Fold the pulldown-cmark event stream into an owned [`Document`] tree.
//! - Apply the tree passes the blog needs: intra-word emphasis suppression,
//!   heading anchor ids and bare-URL autolinks.
//!
//! # Invariants
//! - Parsing never fails; any UTF-8 text is structurally acceptable.
//! - Every heading in a parsed document carries an id, unique within it.
//! - Emphasis never opens or closes inside a word (`snake*case*name`).

use super::node::{Container, Document, Leaf, LeafKind, Node};
use super::title::raw_text_of;
use once_cell::sync::Lazy;
use pulldown_cmark::{CowStr, Event, LinkType, Options, Parser, Tag};
use regex::Regex;
use std::collections::HashMap;

static BARE_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://[^\s<>]+").expect("valid bare url regex"));
static SLUG_SEPARATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s_-]+").expect("valid slug separator regex"));

const URL_TRAILING_PUNCTUATION: &[char] = &['.', ',', ':', ';', '!', '?', '\'', '"', ')'];
const FALLBACK_HEADING_ID: &str = "section";

/// Syntax extensions enabled for every article.
///
/// Fenced code blocks and backslash hard breaks are part of CommonMark
/// itself; autolinks and heading ids are applied as tree passes.
pub fn markdown_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_DEFINITION_LIST);
    options.insert(Options::ENABLE_HEADING_ATTRIBUTES);
    options
}

/// Parses markdown source into a document tree.
pub fn parse(source: &str) -> Document {
    let parser = Parser::new_ext(source, markdown_options());
    let children = suppress_intraword_emphasis(build_tree(parser));
    let mut children = autolink_nodes(children);

    let mut used_ids = HashMap::new();
    collect_explicit_heading_ids(&children, &mut used_ids);
    assign_heading_ids(&mut children, &mut used_ids);

    Document::new(children)
}

fn build_tree<'a>(events: impl Iterator<Item = Event<'a>>) -> Vec<Node> {
    let mut root = Vec::new();
    let mut open: Vec<(Tag<'static>, Vec<Node>)> = Vec::new();

    for event in events {
        match event.into_static() {
            Event::Start(tag) => open.push((tag, Vec::new())),
            Event::End(_) => {
                if let Some((tag, children)) = open.pop() {
                    let node = Node::Container(Container::new(tag, children));
                    attach(&mut open, &mut root, node);
                }
            }
            other => {
                if let Some(leaf) = Leaf::from_event(other) {
                    attach(&mut open, &mut root, Node::Leaf(leaf));
                }
            }
        }
    }

    // The parser always balances tags; close anything left over regardless.
    while let Some((tag, children)) = open.pop() {
        let node = Node::Container(Container::new(tag, children));
        attach(&mut open, &mut root, node);
    }

    root
}

fn attach(open: &mut [(Tag<'static>, Vec<Node>)], root: &mut Vec<Node>, node: Node) {
    match open.last_mut() {
        Some((_, siblings)) => siblings.push(node),
        None => root.push(node),
    }
}

/// Unwraps emphasis and strong spans glued to word characters on both sides,
/// restoring their `*` delimiters as text.
fn suppress_intraword_emphasis(nodes: Vec<Node>) -> Vec<Node> {
    let mut result: Vec<Node> = Vec::with_capacity(nodes.len());
    let mut rest = nodes.into_iter().peekable();

    while let Some(node) = rest.next() {
        let delimiter = match &node {
            Node::Container(container) => emphasis_delimiter(container.tag())
                .filter(|_| ends_with_word_char(result.last()))
                .filter(|_| starts_with_word_char(rest.peek())),
            Node::Leaf(_) => None,
        };

        match (node, delimiter) {
            (Node::Container(container), Some(delimiter)) => {
                push_merged(&mut result, Node::Leaf(Leaf::text(delimiter)));
                for child in suppress_intraword_emphasis(container.into_children()) {
                    push_merged(&mut result, child);
                }
                push_merged(&mut result, Node::Leaf(Leaf::text(delimiter)));
            }
            (Node::Container(mut container), None) => {
                if !matches!(container.tag(), Tag::CodeBlock(_) | Tag::HtmlBlock) {
                    let children = std::mem::take(container.children_mut());
                    *container.children_mut() = suppress_intraword_emphasis(children);
                }
                result.push(Node::Container(container));
            }
            (leaf, _) => push_merged(&mut result, leaf),
        }
    }
    result
}

fn emphasis_delimiter(tag: &Tag<'static>) -> Option<&'static str> {
    match tag {
        Tag::Emphasis => Some("*"),
        Tag::Strong => Some("**"),
        _ => None,
    }
}

fn text_literal(node: Option<&Node>) -> Option<&str> {
    node.and_then(Node::as_leaf)
        .filter(|leaf| leaf.kind() == LeafKind::Text)
        .map(Leaf::literal)
}

fn ends_with_word_char(node: Option<&Node>) -> bool {
    text_literal(node)
        .and_then(|text| text.chars().next_back())
        .is_some_and(char::is_alphanumeric)
}

fn starts_with_word_char(node: Option<&Node>) -> bool {
    text_literal(node)
        .and_then(|text| text.chars().next())
        .is_some_and(char::is_alphanumeric)
}

/// Pushes `node`, joining it onto a preceding text leaf when both are text.
fn push_merged(nodes: &mut Vec<Node>, node: Node) {
    if let (Some(Node::Leaf(last)), Node::Leaf(next)) = (nodes.last_mut(), &node) {
        if last.kind() == LeafKind::Text && next.kind() == LeafKind::Text {
            *last = Leaf::text(format!("{}{}", last.literal(), next.literal()));
            return;
        }
    }
    nodes.push(node);
}

fn autolink_nodes(nodes: Vec<Node>) -> Vec<Node> {
    let mut result = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Node::Leaf(leaf) if leaf.kind() == LeafKind::Text => {
                result.extend(autolink_text(leaf.literal()));
            }
            Node::Container(mut container) if links_allowed_inside(container.tag()) => {
                let children = std::mem::take(container.children_mut());
                *container.children_mut() = autolink_nodes(children);
                result.push(Node::Container(container));
            }
            other => result.push(other),
        }
    }
    result
}

fn links_allowed_inside(tag: &Tag<'static>) -> bool {
    !matches!(
        tag,
        Tag::Link { .. } | Tag::Image { .. } | Tag::CodeBlock(_) | Tag::HtmlBlock
    )
}

fn autolink_text(text: &str) -> Vec<Node> {
    let mut nodes = Vec::new();
    let mut cursor = 0;

    for found in BARE_URL_RE.find_iter(text) {
        let url = found.as_str().trim_end_matches(URL_TRAILING_PUNCTUATION);
        if url.len() <= "https://".len() {
            continue;
        }
        let start = found.start();
        let end = start + url.len();

        if start > cursor {
            nodes.push(Node::Leaf(Leaf::text(&text[cursor..start])));
        }
        let link = Tag::Link {
            link_type: LinkType::Autolink,
            dest_url: CowStr::from(url.to_string()),
            title: CowStr::Borrowed(""),
            id: CowStr::Borrowed(""),
        };
        nodes.push(Node::Container(Container::new(
            link,
            vec![Node::Leaf(Leaf::text(url))],
        )));
        cursor = end;
    }

    if cursor < text.len() || nodes.is_empty() {
        nodes.push(Node::Leaf(Leaf::text(&text[cursor..])));
    }
    nodes
}

fn collect_explicit_heading_ids(nodes: &[Node], used: &mut HashMap<String, usize>) {
    for node in nodes {
        if let Some(container) = node.as_container() {
            if let Tag::Heading { id: Some(id), .. } = container.tag() {
                used.entry(id.to_string()).or_insert(0);
            }
            collect_explicit_heading_ids(container.children(), used);
        }
    }
}

fn assign_heading_ids(nodes: &mut [Node], used: &mut HashMap<String, usize>) {
    for node in nodes.iter_mut() {
        let Some(container) = node.as_container_mut() else {
            continue;
        };
        if needs_heading_id(container) {
            let value = unique_id(slugify(&raw_text_of(container.children())), used);
            if let Tag::Heading { id, .. } = container.tag_mut() {
                *id = Some(CowStr::from(value));
            }
        }
        assign_heading_ids(container.children_mut(), used);
    }
}

fn needs_heading_id(container: &Container) -> bool {
    matches!(container.tag(), Tag::Heading { id: None, .. })
}

fn unique_id(base: String, used: &mut HashMap<String, usize>) -> String {
    let base = if base.is_empty() {
        FALLBACK_HEADING_ID.to_string()
    } else {
        base
    };

    let mut candidate = base.clone();
    while used.contains_key(&candidate) {
        let count = used.entry(base.clone()).or_insert(0);
        *count += 1;
        candidate = format!("{base}-{count}");
    }
    used.insert(candidate.clone(), 0);
    candidate
}

/// Converts heading text into an anchor id.
///
/// Lowercases, keeps alphanumerics, turns whitespace/underscore/hyphen runs
/// into a single `-` and trims `-` from both ends.
pub fn slugify(input: &str) -> String {
    let kept = input
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '-' || *c == '_')
        .collect::<String>();
    SLUG_SEPARATOR_RE
        .replace_all(&kept, "-")
        .trim_matches('-')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::{autolink_text, parse, slugify, unique_id};
    use crate::markdown::node::LeafKind;
    use std::collections::HashMap;

    #[test]
    fn intraword_emphasis_becomes_one_text_leaf() {
        let document = parse("foo*bar*baz and x**y**z");
        let paragraph = document.children()[0].as_container().unwrap();
        assert_eq!(paragraph.children().len(), 1);
        let leaf = paragraph.children()[0].as_leaf().unwrap();
        assert_eq!(leaf.kind(), LeafKind::Text);
        assert_eq!(leaf.literal(), "foo*bar*baz and x**y**z");
    }

    #[test]
    fn emphasis_at_word_boundary_is_kept() {
        let document = parse("a *b* c and foo*bar*");
        let paragraph = document.children()[0].as_container().unwrap();
        let emphasized = paragraph
            .children()
            .iter()
            .filter(|node| node.is_container())
            .count();
        assert_eq!(emphasized, 2);
    }

    #[test]
    fn slugify_normalizes_separators_and_symbols() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("  Rust & Safety  "), "rust-safety");
        assert_eq!(slugify("snake_case -- title"), "snake-case-title");
        assert_eq!(slugify("???"), "");
    }

    #[test]
    fn unique_id_appends_counter_on_collision() {
        let mut used = HashMap::new();
        assert_eq!(unique_id("intro".to_string(), &mut used), "intro");
        assert_eq!(unique_id("intro".to_string(), &mut used), "intro-1");
        assert_eq!(unique_id("intro".to_string(), &mut used), "intro-2");
        assert_eq!(unique_id(String::new(), &mut used), "section");
    }

    #[test]
    fn autolink_splits_text_around_urls_and_drops_trailing_punctuation() {
        let nodes = autolink_text("see https://example.com/a. done");
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[0].as_leaf().unwrap().literal(), "see ");
        assert!(nodes[1].is_container());
        assert_eq!(nodes[2].as_leaf().unwrap().literal(), ". done");
    }

    #[test]
    fn autolink_keeps_plain_text_untouched() {
        let nodes = autolink_text("no links here");
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].as_leaf().unwrap().literal(), "no links here");
    }
}
