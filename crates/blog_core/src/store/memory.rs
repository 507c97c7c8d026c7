//! In-memory article store with whole-snapshot swaps.
//!
//! # Responsibility
//! - Serve concurrent name lookups and listings from an immutable snapshot.
//! - Rebuild the snapshot from the source directory and publish it atomically.
//!
//! # Invariants
//! - A published [`Snapshot`] is never mutated; refreshes build a new one.
//! - Parsing and rendering run outside the lock; the exclusive section only
//!   replaces one `Arc`.
//! - A failed directory listing keeps the previous snapshot in service.
//! - A new store starts with an empty snapshot and needs no teardown.

use super::timestamps::{self, PublishTimestamp};
use super::{ArticleStore, ReconcileReport, StoreError};
use crate::model::article::{now_epoch_ms, Article};
use crate::source::scanner::{list_markdown_files, load_article_from_file};
use log::{error, info, warn};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Instant;

/// One immutable article set.
#[derive(Debug, Default)]
pub struct Snapshot {
    articles: Vec<Arc<Article>>,
    index: HashMap<String, usize>,
    refreshed_at: Option<i64>,
}

impl Snapshot {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            articles: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
            refreshed_at: None,
        }
    }

    /// Adds `article`, replacing any earlier entry with the same name in
    /// place. Returns `true` when the name was new.
    fn insert(&mut self, article: Article) -> bool {
        let article = Arc::new(article);
        match self.index.get(&article.name) {
            Some(&position) => {
                self.articles[position] = article;
                false
            }
            None => {
                self.index
                    .insert(article.name.clone(), self.articles.len());
                self.articles.push(article);
                true
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Article>> {
        self.index.get(name).map(|&position| &self.articles[position])
    }

    /// Articles in construction (directory-listing) order.
    pub fn articles(&self) -> &[Arc<Article>] {
        &self.articles
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    /// Epoch milliseconds of the swap that published this snapshot.
    pub fn refreshed_at(&self) -> Option<i64> {
        self.refreshed_at
    }
}

/// Process-wide article cache guarded by one reader/writer lock.
#[derive(Debug, Default)]
pub struct MemoryArticleStore {
    current: RwLock<Arc<Snapshot>>,
    /// Serializes snapshot builders so carry-over reads a settled predecessor.
    rebuild_lock: Mutex<()>,
}

impl MemoryArticleStore {
    /// Creates a store serving an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current snapshot; the read lock is held only for the
    /// `Arc` clone.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Epoch milliseconds of the last successful refresh, if any.
    pub fn last_refresh(&self) -> Option<i64> {
        self.snapshot().refreshed_at()
    }

    /// Rebuilds the article set from `dir` and publishes it.
    ///
    /// Files that fail to load are logged and left out. `created_at` is
    /// carried over from the previous snapshot for known names and falls back
    /// to the file modification time for new ones.
    ///
    /// # Errors
    /// - `StoreError::Source` when `dir` cannot be listed; the previous
    ///   snapshot stays published.
    pub fn refresh(&self, dir: &Path) -> Result<ReconcileReport, StoreError> {
        let started_at = Instant::now();
        let _rebuild = self
            .rebuild_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let previous = self.snapshot();

        let files = match list_markdown_files(dir) {
            Ok(files) => files,
            Err(err) => {
                error!(
                    "event=reconcile module=store status=error variant=memory dir={} error={}",
                    dir.display(),
                    err
                );
                return Err(err.into());
            }
        };

        let mut report = ReconcileReport {
            scanned: files.len(),
            ..ReconcileReport::default()
        };
        let mut next = Snapshot::with_capacity(files.len());

        for file in &files {
            let mut article = match load_article_from_file(file) {
                Ok(article) => article,
                Err(err) => {
                    warn!(
                        "event=article_load module=store status=skip path={} error={}",
                        file.display(),
                        err
                    );
                    report.skipped += 1;
                    continue;
                }
            };

            let existed = match previous.get(&article.name) {
                Some(known) => {
                    article.created_at = known.created_at.or(article.updated_at);
                    true
                }
                None => {
                    article.created_at = article.updated_at;
                    false
                }
            };

            if next.insert(article) {
                if existed {
                    report.updated += 1;
                } else {
                    report.created += 1;
                }
            }
        }

        self.publish(next);
        info!(
            "event=reconcile module=store status=ok variant=memory scanned={} created={} updated={} skipped={} duration_ms={}",
            report.scanned,
            report.created,
            report.updated,
            report.skipped,
            started_at.elapsed().as_millis()
        );
        Ok(report)
    }

    /// Exports `{name: {created_at, updated_at}}` of the current snapshot as
    /// JSON.
    pub fn export_publish_timestamps(&self) -> Result<Vec<u8>, StoreError> {
        let snapshot = self.snapshot();
        let data = timestamps::encode(snapshot.articles().iter().map(|article| {
            (
                article.name.clone(),
                PublishTimestamp {
                    created_at: article.created_at,
                    updated_at: article.updated_at,
                },
            )
        }))?;
        Ok(data)
    }

    /// Applies exported publish timestamps to the current snapshot.
    ///
    /// For each known name, `created_at` is replaced and `updated_at` keeps
    /// the later of both values. Unknown names are ignored. Because refreshes
    /// carry `created_at` over, imported creation times survive later
    /// refreshes. Returns the number of articles touched.
    ///
    /// # Errors
    /// - `StoreError::Timestamps` when `data` is not a valid timestamp map;
    ///   the snapshot is left unchanged.
    pub fn import_publish_timestamps(&self, data: &[u8]) -> Result<usize, StoreError> {
        let imported = timestamps::decode(data)?;
        let _rebuild = self
            .rebuild_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let previous = self.snapshot();

        let mut next = Snapshot::with_capacity(previous.len());
        let mut touched = 0;
        for article in previous.articles() {
            let mut article = Article::clone(article);
            if let Some(stamp) = imported.get(&article.name) {
                stamp.apply_to(&mut article);
                touched += 1;
            }
            next.insert(article);
        }

        self.publish(next);
        info!(
            "event=timestamps_import module=store status=ok entries={} touched={}",
            imported.len(),
            touched
        );
        Ok(touched)
    }

    fn publish(&self, mut next: Snapshot) {
        next.refreshed_at = Some(now_epoch_ms());
        let count = next.len();
        let next = Arc::new(next);

        let mut current = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *current = next;
        drop(current);

        info!(
            "event=snapshot_swap module=store status=ok articles={}",
            count
        );
    }
}

impl ArticleStore for MemoryArticleStore {
    type Error = StoreError;

    fn get_by_name(&self, name: &str) -> Result<Option<Article>, Self::Error> {
        Ok(self
            .snapshot()
            .get(name)
            .map(|article| Article::clone(article)))
    }

    fn list(&self) -> Result<Vec<Article>, Self::Error> {
        Ok(self
            .snapshot()
            .articles()
            .iter()
            .map(|article| Article::clone(article))
            .collect())
    }

    fn reconcile_from_directory(&self, dir: &Path) -> Result<ReconcileReport, Self::Error> {
        self.refresh(dir)
    }
}
