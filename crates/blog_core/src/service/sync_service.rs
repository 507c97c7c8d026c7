//! Persisted article reconciliation.
//!
//! # Responsibility
//! - Upsert every markdown source of a directory into the article table,
//!   keyed by article name.
//! - Expose the persisted table through the shared [`ArticleStore`] contract.
//!
//! # Invariants
//! - Each lookup/insert/update is its own unit of work; no transaction spans
//!   the directory, so a re-run after a crash converges to the same rows.
//! - Reconciliation never deletes rows; removed source files keep their rows.
//! - A row vanishing between lookup and update skips that file only; any
//!   other repository failure aborts the run.

use crate::model::article::Article;
use crate::repo::article_repo::{ArticleRepository, RepoError};
use crate::source::scanner::{list_markdown_files, load_article_from_file, SourceError};
use crate::store::{ArticleStore, ReconcileReport};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::Instant;

/// Failure that aborts a persisted reconciliation run.
#[derive(Debug)]
pub enum SyncError {
    /// The source directory could not be listed.
    Source(SourceError),
    /// Lookup or write against the article table failed.
    Repo(RepoError),
}

impl Display for SyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Source(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SyncError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Source(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<SourceError> for SyncError {
    fn from(value: SourceError) -> Self {
        Self::Source(value)
    }
}

impl From<RepoError> for SyncError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// What happened to one article during an upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

/// Article store backed by a persisted repository.
pub struct ArticleSyncService<R: ArticleRepository> {
    repo: R,
}

impl<R: ArticleRepository> ArticleSyncService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Borrows the underlying repository for direct CRUD calls.
    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Inserts `article` when its name is unknown, otherwise updates the
    /// existing row in place (keeping its id and `created_at`).
    ///
    /// # Errors
    /// - `RepoError::NotFound` when the row vanished between lookup and update.
    /// - Any other `RepoError` from lookup or write.
    pub fn upsert_article(&self, mut article: Article) -> Result<UpsertOutcome, RepoError> {
        match self.repo.get_article_by_name(&article.name)? {
            Some(existing) => {
                article.id = existing.id;
                self.repo.update_article(&article)?;
                info!(
                    "event=article_upsert module=sync status=ok action=update name={}",
                    article.name
                );
                Ok(UpsertOutcome::Updated)
            }
            None => {
                let id = self.repo.create_article(&article)?;
                info!(
                    "event=article_upsert module=sync status=ok action=create name={} id={}",
                    article.name, id
                );
                Ok(UpsertOutcome::Created)
            }
        }
    }

    /// Upserts every markdown file of `dir` into the article table.
    ///
    /// Unreadable files and update races are logged and counted as skipped.
    ///
    /// # Errors
    /// - `SyncError::Source` when `dir` cannot be listed.
    /// - `SyncError::Repo` on lookup/write failures other than the update
    ///   race; rows committed earlier in the run stay committed.
    pub fn reconcile_directory(&self, dir: &Path) -> Result<ReconcileReport, SyncError> {
        let started_at = Instant::now();
        info!(
            "event=reconcile module=sync status=start variant=persisted dir={}",
            dir.display()
        );

        let files = list_markdown_files(dir).map_err(|err| {
            error!(
                "event=reconcile module=sync status=error variant=persisted dir={} error={}",
                dir.display(),
                err
            );
            SyncError::from(err)
        })?;

        let mut report = ReconcileReport {
            scanned: files.len(),
            ..ReconcileReport::default()
        };

        for file in &files {
            let article = match load_article_from_file(file) {
                Ok(article) => article,
                Err(err) => {
                    warn!(
                        "event=article_load module=sync status=skip path={} error={}",
                        file.display(),
                        err
                    );
                    report.skipped += 1;
                    continue;
                }
            };
            let name = article.name.clone();

            match self.upsert_article(article) {
                Ok(UpsertOutcome::Created) => report.created += 1,
                Ok(UpsertOutcome::Updated) => report.updated += 1,
                Err(RepoError::NotFound(id)) => {
                    warn!(
                        "event=article_upsert module=sync status=skip name={} id={} reason=row_vanished",
                        name, id
                    );
                    report.skipped += 1;
                }
                Err(err) => {
                    error!(
                        "event=reconcile module=sync status=error variant=persisted name={} error={}",
                        name, err
                    );
                    return Err(err.into());
                }
            }
        }

        info!(
            "event=reconcile module=sync status=ok variant=persisted scanned={} created={} updated={} skipped={} duration_ms={}",
            report.scanned,
            report.created,
            report.updated,
            report.skipped,
            started_at.elapsed().as_millis()
        );
        Ok(report)
    }
}

impl<R: ArticleRepository> ArticleStore for ArticleSyncService<R> {
    type Error = SyncError;

    fn get_by_name(&self, name: &str) -> Result<Option<Article>, Self::Error> {
        Ok(self.repo.get_article_by_name(name)?)
    }

    fn list(&self) -> Result<Vec<Article>, Self::Error> {
        Ok(self.repo.list_articles()?)
    }

    fn reconcile_from_directory(&self, dir: &Path) -> Result<ReconcileReport, Self::Error> {
        self.reconcile_directory(dir)
    }
}
