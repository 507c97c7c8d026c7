//! Article repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over the `articles` table.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths call `Article::validate()` before SQL mutations.
//! - `created_at`/`updated_at` are assigned by the store, never by callers.
//! - Id-based writes report a vanished row as `RepoError::NotFound`.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::{missing_column, table_exists, DbError};
use crate::model::article::{Article, ArticleId, ArticleValidationError};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const ARTICLES_TABLE: &str = "articles";
const REQUIRED_COLUMNS: &[&str] = &[
    "id",
    "name",
    "title",
    "raw_title",
    "content",
    "created_at",
    "updated_at",
];

const ARTICLE_SELECT_SQL: &str = "SELECT
    id,
    name,
    title,
    raw_title,
    content,
    created_at,
    updated_at
FROM articles";

const NOW_EPOCH_MS_SQL: &str = "CAST((julianday('now') - 2440587.5) * 86400000 AS INTEGER)";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for article persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ArticleValidationError),
    Db(DbError),
    /// No row carries this id (deleted between lookup and write).
    NotFound(ArticleId),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "article id does not exist: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted article data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ArticleValidationError> for RepoError {
    fn from(value: ArticleValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for persisted articles.
pub trait ArticleRepository {
    /// Inserts a new row; the store assigns id and both timestamps.
    fn create_article(&self, article: &Article) -> RepoResult<ArticleId>;
    /// Rewrites name/title/raw title/content of the row with `article.id`
    /// and refreshes `updated_at`.
    fn update_article(&self, article: &Article) -> RepoResult<()>;
    fn get_article_by_name(&self, name: &str) -> RepoResult<Option<Article>>;
    fn get_article_by_id(&self, id: ArticleId) -> RepoResult<Option<Article>>;
    /// Lists every row, newest `created_at` first.
    fn list_articles(&self) -> RepoResult<Vec<Article>>;
    fn delete_article(&self, id: ArticleId) -> RepoResult<()>;
}

/// SQLite-backed article repository.
pub struct SqliteArticleRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteArticleRepository<'conn> {
    /// Wraps a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations were not applied.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the schema
    ///   does not carry the article table shape.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let expected_version = latest_version();
        let actual_version = current_user_version(conn)?;
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }

        if !table_exists(conn, ARTICLES_TABLE)? {
            return Err(RepoError::MissingRequiredTable(ARTICLES_TABLE));
        }
        if let Some(column) = missing_column(conn, ARTICLES_TABLE, REQUIRED_COLUMNS)? {
            return Err(RepoError::MissingRequiredColumn {
                table: ARTICLES_TABLE,
                column,
            });
        }

        Ok(Self { conn })
    }
}

impl ArticleRepository for SqliteArticleRepository<'_> {
    fn create_article(&self, article: &Article) -> RepoResult<ArticleId> {
        article.validate()?;

        self.conn.execute(
            &format!(
                "INSERT INTO articles (
                    name,
                    title,
                    raw_title,
                    content,
                    created_at,
                    updated_at
                ) VALUES (?1, ?2, ?3, ?4, {NOW_EPOCH_MS_SQL}, {NOW_EPOCH_MS_SQL});"
            ),
            params![
                article.name.as_str(),
                article.title.as_str(),
                article.raw_title.as_str(),
                article.content.as_str(),
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update_article(&self, article: &Article) -> RepoResult<()> {
        article.validate()?;
        let id = article.id.ok_or_else(|| {
            RepoError::InvalidData(format!("article `{}` has no id to update", article.name))
        })?;

        let changed = self.conn.execute(
            &format!(
                "UPDATE articles
                 SET
                    name = ?1,
                    title = ?2,
                    raw_title = ?3,
                    content = ?4,
                    updated_at = {NOW_EPOCH_MS_SQL}
                 WHERE id = ?5;"
            ),
            params![
                article.name.as_str(),
                article.title.as_str(),
                article.raw_title.as_str(),
                article.content.as_str(),
                id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn get_article_by_name(&self, name: &str) -> RepoResult<Option<Article>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ARTICLE_SELECT_SQL}
             WHERE name = ?1
             ORDER BY id ASC
             LIMIT 1;"
        ))?;

        let article = stmt.query_row([name], parse_article_row).optional()?;
        article.map(checked).transpose()
    }

    fn get_article_by_id(&self, id: ArticleId) -> RepoResult<Option<Article>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ARTICLE_SELECT_SQL} WHERE id = ?1;"))?;

        let article = stmt.query_row([id], parse_article_row).optional()?;
        article.map(checked).transpose()
    }

    fn list_articles(&self) -> RepoResult<Vec<Article>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ARTICLE_SELECT_SQL} ORDER BY created_at DESC, id DESC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut articles = Vec::new();

        while let Some(row) = rows.next()? {
            articles.push(checked(parse_article_row(row)?)?);
        }

        Ok(articles)
    }

    fn delete_article(&self, id: ArticleId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM articles WHERE id = ?1;", [id])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

fn parse_article_row(row: &Row<'_>) -> rusqlite::Result<Article> {
    Ok(Article {
        id: Some(row.get("id")?),
        name: row.get("name")?,
        title: row.get("title")?,
        raw_title: row.get("raw_title")?,
        content: row.get("content")?,
        created_at: Some(row.get("created_at")?),
        updated_at: Some(row.get("updated_at")?),
    })
}

fn checked(article: Article) -> RepoResult<Article> {
    article.validate().map_err(|err| {
        RepoError::InvalidData(format!(
            "row {} violates article invariants: {err}",
            article.id.unwrap_or_default()
        ))
    })?;
    Ok(article)
}
