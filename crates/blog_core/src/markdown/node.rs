//! Markdown document tree.
//!
//! # Responsibility
//! - Hold a parsed markdown document as an owned tree of leaf/container nodes.
//! - Offer capability queries (`as_leaf`, `as_container`) instead of type switches.
//!
//! # Invariants
//! - Leaves never have children; containers never carry literal text.
//! - Child order is document order.

use pulldown_cmark::{CowStr, Event, Tag};

/// Kind of a leaf node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafKind {
    /// Plain text run.
    Text,
    /// Inline code span.
    Code,
    /// Raw block-level HTML.
    Html,
    /// Raw inline HTML.
    InlineHtml,
    /// Inline math span (`$...$`).
    InlineMath,
    /// Display math block (`$$...$$`).
    DisplayMath,
    /// Footnote reference label.
    FootnoteReference,
    /// Soft line break.
    SoftBreak,
    /// Hard line break.
    HardBreak,
    /// Thematic break (`---`).
    Rule,
    /// Task list checkbox, `true` when checked.
    TaskListMarker(bool),
}

/// Tree node holding literal text and no children.
#[derive(Debug, Clone, PartialEq)]
pub struct Leaf {
    kind: LeafKind,
    literal: String,
}

impl Leaf {
    pub fn new(kind: LeafKind, literal: impl Into<String>) -> Self {
        Self {
            kind,
            literal: literal.into(),
        }
    }

    /// Shorthand for a plain text leaf.
    pub fn text(literal: impl Into<String>) -> Self {
        Self::new(LeafKind::Text, literal)
    }

    pub fn kind(&self) -> LeafKind {
        self.kind
    }

    /// Literal text of this leaf. Empty for breaks, rules and task markers.
    pub fn literal(&self) -> &str {
        &self.literal
    }

    pub(crate) fn from_event(event: Event<'static>) -> Option<Self> {
        let leaf = match event {
            Event::Text(text) => Self::new(LeafKind::Text, text.into_string()),
            Event::Code(code) => Self::new(LeafKind::Code, code.into_string()),
            Event::Html(html) => Self::new(LeafKind::Html, html.into_string()),
            Event::InlineHtml(html) => Self::new(LeafKind::InlineHtml, html.into_string()),
            Event::InlineMath(math) => Self::new(LeafKind::InlineMath, math.into_string()),
            Event::DisplayMath(math) => Self::new(LeafKind::DisplayMath, math.into_string()),
            Event::FootnoteReference(label) => {
                Self::new(LeafKind::FootnoteReference, label.into_string())
            }
            Event::SoftBreak => Self::new(LeafKind::SoftBreak, ""),
            Event::HardBreak => Self::new(LeafKind::HardBreak, ""),
            Event::Rule => Self::new(LeafKind::Rule, ""),
            Event::TaskListMarker(checked) => Self::new(LeafKind::TaskListMarker(checked), ""),
            Event::Start(_) | Event::End(_) => return None,
        };
        Some(leaf)
    }

    pub(crate) fn to_event(&self) -> Event<'static> {
        let literal = || CowStr::from(self.literal.clone());
        match self.kind {
            LeafKind::Text => Event::Text(literal()),
            LeafKind::Code => Event::Code(literal()),
            LeafKind::Html => Event::Html(literal()),
            LeafKind::InlineHtml => Event::InlineHtml(literal()),
            LeafKind::InlineMath => Event::InlineMath(literal()),
            LeafKind::DisplayMath => Event::DisplayMath(literal()),
            LeafKind::FootnoteReference => Event::FootnoteReference(literal()),
            LeafKind::SoftBreak => Event::SoftBreak,
            LeafKind::HardBreak => Event::HardBreak,
            LeafKind::Rule => Event::Rule,
            LeafKind::TaskListMarker(checked) => Event::TaskListMarker(checked),
        }
    }
}

/// Tree node holding an ordered sequence of children.
///
/// The container kind is the markdown tag it was opened with (paragraph,
/// heading, list, table cell, link, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    tag: Tag<'static>,
    children: Vec<Node>,
}

impl Container {
    pub fn new(tag: Tag<'static>, children: Vec<Node>) -> Self {
        Self { tag, children }
    }

    pub fn tag(&self) -> &Tag<'static> {
        &self.tag
    }

    pub(crate) fn tag_mut(&mut self) -> &mut Tag<'static> {
        &mut self.tag
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<Node> {
        &mut self.children
    }

    pub fn into_children(self) -> Vec<Node> {
        self.children
    }

    pub fn is_heading(&self) -> bool {
        matches!(self.tag, Tag::Heading { .. })
    }
}

/// One node of a parsed markdown tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Leaf(Leaf),
    Container(Container),
}

impl Node {
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Self::Container(_))
    }

    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            Self::Leaf(leaf) => Some(leaf),
            Self::Container(_) => None,
        }
    }

    pub fn as_container(&self) -> Option<&Container> {
        match self {
            Self::Container(container) => Some(container),
            Self::Leaf(_) => None,
        }
    }

    pub fn as_container_mut(&mut self) -> Option<&mut Container> {
        match self {
            Self::Container(container) => Some(container),
            Self::Leaf(_) => None,
        }
    }

    pub fn is_heading(&self) -> bool {
        self.as_container().is_some_and(Container::is_heading)
    }
}

impl From<Leaf> for Node {
    fn from(value: Leaf) -> Self {
        Self::Leaf(value)
    }
}

impl From<Container> for Node {
    fn from(value: Container) -> Self {
        Self::Container(value)
    }
}

/// Root container of a parsed markdown tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    children: Vec<Node>,
}

impl Document {
    pub fn new(children: Vec<Node>) -> Self {
        Self { children }
    }

    /// Direct (top-level) children in document order.
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<Node> {
        &mut self.children
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}
