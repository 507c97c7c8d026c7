//! Article domain model and markdown transformation.
//!
//! # Responsibility
//! - Define the canonical article record.
//! - Build articles from markdown sources (title extraction + HTML rendering).
//!
//! # Invariants
//! - `name` is non-empty and never contains a path separator.
//! - `raw_title` is whitespace-trimmed plain text.
//! - `title` and `content` are HTML fragments.
//! - Timestamps are Unix epoch milliseconds and are owned by stores, not by
//!   the transformation.

use crate::markdown::{self, Leaf, Node};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

/// File suffix of article sources.
pub const MARKDOWN_SUFFIX: &str = ".md";

/// Store-assigned numeric identity of a persisted article.
pub type ArticleId = i64;

/// Validation errors for article invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArticleValidationError {
    EmptyName,
    NameContainsSeparator(String),
}

impl Display for ArticleValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "article name must not be empty"),
            Self::NameContainsSeparator(name) => {
                write!(f, "article name `{name}` must not contain a path separator")
            }
        }
    }
}

impl Error for ArticleValidationError {}

/// One blog article built from a markdown source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Present only for articles read back from the persisted store.
    pub id: Option<ArticleId>,
    /// Source file base name without the `.md` suffix.
    pub name: String,
    /// HTML rendering of the extracted heading, or the escaped name.
    pub title: String,
    /// Plain-text title used for `<title>` tags and sorting.
    pub raw_title: String,
    /// HTML rendering of the document after heading removal.
    pub content: String,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
}

impl Article {
    /// Builds an article from markdown source text.
    ///
    /// The first top-level heading is removed from the document and becomes
    /// the title; the rest renders as `content`. Without a heading, both
    /// titles fall back to `name` and the whole document is the content.
    pub fn from_markdown(name: impl Into<String>, source: &str) -> Self {
        let name = name.into();
        let mut document = markdown::parse(source);

        let (title, raw_title) = match markdown::extract_first_heading(&mut document) {
            Some(heading) => (
                markdown::render_nodes(heading.children()),
                markdown::raw_text_of(heading.children()),
            ),
            None => (
                markdown::render_node(&Node::Leaf(Leaf::text(name.as_str()))),
                name.clone(),
            ),
        };

        Self {
            id: None,
            content: markdown::render(&document),
            name,
            title,
            raw_title,
            created_at: None,
            updated_at: None,
        }
    }

    /// Checks article invariants before persistence or publication.
    pub fn validate(&self) -> Result<(), ArticleValidationError> {
        validate_name(&self.name)
    }
}

/// Checks that `name` is usable as an article key.
pub fn validate_name(name: &str) -> Result<(), ArticleValidationError> {
    if name.is_empty() {
        return Err(ArticleValidationError::EmptyName);
    }
    if name.contains(['/', '\\']) {
        return Err(ArticleValidationError::NameContainsSeparator(
            name.to_string(),
        ));
    }
    Ok(())
}

/// Derives the article name from a source file name (`hello.md` -> `hello`).
///
/// Returns `None` when the file name does not carry the markdown suffix.
pub fn article_name_from_file_name(file_name: &str) -> Option<&str> {
    file_name.strip_suffix(MARKDOWN_SUFFIX)
}

/// Orders articles newest first by `created_at`; ties fall back to name.
///
/// Articles without a creation time sort last.
pub fn sort_newest_first(articles: &mut [Article]) {
    articles.sort_by(|a, b| match (a.created_at, b.created_at) {
        (Some(left), Some(right)) => right.cmp(&left).then_with(|| a.name.cmp(&b.name)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.name.cmp(&b.name),
    });
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    epoch_ms(SystemTime::now())
}

/// Converts a system time into epoch milliseconds, clamping pre-epoch
/// values to zero.
pub fn epoch_ms(time: SystemTime) -> i64 {
    time.duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
