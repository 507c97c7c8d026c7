//! Core of a minimal markdown blog engine.
//!
//! Markdown files on disk become [`Article`] values (first heading split off
//! as the title, the rest rendered to HTML) and are served from a store that
//! is periodically reconciled against the source directory, either in memory
//! or in a SQLite table.

pub mod config;
pub mod db;
pub mod logging;
pub mod markdown;
pub mod model;
pub mod project;
pub mod refresh;
pub mod repo;
pub mod service;
pub mod source;
pub mod store;

pub use config::{BlogConfig, ConfigError};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::article::{sort_newest_first, Article, ArticleId, ArticleValidationError};
pub use project::{init_project_tree, ProjectInitReport};
pub use refresh::{refresh_once, spawn_refresh_loop};
pub use repo::article_repo::{ArticleRepository, RepoError, RepoResult, SqliteArticleRepository};
pub use service::sync_service::{ArticleSyncService, SyncError, UpsertOutcome};
pub use source::scanner::{list_markdown_files, load_article_from_file, SourceError};
pub use store::{ArticleStore, MemoryArticleStore, ReconcileReport, StoreError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
