//! Name-keyed article stores.
//!
//! # Responsibility
//! - Define the read/reconcile contract shared by every article store.
//! - Provide the in-memory snapshot store used by the file-based blog.
//!
//! # Invariants
//! - `name` is unique within one store; reconciliation replaces, never
//!   duplicates.
//! - Readers observe either the previous or the next article set, never a mix.
//!
//! # See also
//! - `service::sync_service` for the persisted variant.

pub mod memory;
pub mod timestamps;

use crate::model::article::Article;
use crate::source::scanner::SourceError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

pub use memory::{MemoryArticleStore, Snapshot};
pub use timestamps::PublishTimestamp;

/// Outcome counters of one reconciliation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Markdown files found in the source directory.
    pub scanned: usize,
    /// Articles whose name was not present before this run.
    pub created: usize,
    /// Articles whose name was already present and got replaced.
    pub updated: usize,
    /// Files that failed to load or persist and were left out.
    pub skipped: usize,
}

/// Read and reconcile contract exposed to the presentation layer.
pub trait ArticleStore {
    type Error: Error + Send + Sync + 'static;

    /// Looks up one article by its unique name.
    fn get_by_name(&self, name: &str) -> Result<Option<Article>, Self::Error>;

    /// Returns every article; ordering is store specific.
    fn list(&self) -> Result<Vec<Article>, Self::Error>;

    /// Re-scans `dir` and brings the store in line with its markdown files.
    fn reconcile_from_directory(&self, dir: &Path) -> Result<ReconcileReport, Self::Error>;
}

/// Error type of the in-memory store.
#[derive(Debug)]
pub enum StoreError {
    /// The source directory could not be listed; the previous snapshot stays.
    Source(SourceError),
    /// Publish timestamps could not be encoded or decoded.
    Timestamps(serde_json::Error),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Source(err) => write!(f, "{err}"),
            Self::Timestamps(err) => write!(f, "invalid publish timestamps: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Source(err) => Some(err),
            Self::Timestamps(err) => Some(err),
        }
    }
}

impl From<SourceError> for StoreError {
    fn from(value: SourceError) -> Self {
        Self::Source(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Timestamps(value)
    }
}
