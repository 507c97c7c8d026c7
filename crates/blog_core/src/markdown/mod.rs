//! Markdown document model.
//!
//! # Responsibility
//! - Parse article sources into an owned leaf/container tree.
//! - Extract titles from that tree and render (sub)trees to HTML.
//!
//! # Invariants
//! - The enabled extension set is fixed: tables, fenced code, autolinks,
//!   strikethrough, definition lists, heading ids and backslash line breaks.

pub mod node;
pub mod parse;
pub mod render;
pub mod title;

pub use node::{Container, Document, Leaf, LeafKind, Node};
pub use parse::{markdown_options, parse, slugify};
pub use render::{render, render_node, render_nodes};
pub use title::{extract_first_heading, raw_text, raw_text_of};
