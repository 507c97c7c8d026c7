//! Domain model for blog articles.
//!
//! # Responsibility
//! - Define the article record shared by the in-memory and persisted stores.
//! - Own the markdown-to-article transformation.
//!
//! # Invariants
//! - `Article::name` is the unique key of an article within one store.
//! - `content` never contains the heading that became `title`.

pub mod article;
