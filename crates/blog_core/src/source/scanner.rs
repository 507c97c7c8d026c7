//! Directory scanning and per-file article loading.

use crate::model::article::{
    article_name_from_file_name, epoch_ms, Article, ArticleValidationError, MARKDOWN_SUFFIX,
};
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};

pub type SourceResult<T> = Result<T, SourceError>;

/// Failure to read article sources.
#[derive(Debug)]
pub enum SourceError {
    /// The articles directory itself cannot be listed.
    ListDirectory { path: PathBuf, source: io::Error },
    /// A source file cannot be read.
    ReadFile { path: PathBuf, source: io::Error },
    /// Source file metadata (modification time) is unavailable.
    Metadata { path: PathBuf, source: io::Error },
    /// The file name does not yield a valid article name.
    InvalidName {
        path: PathBuf,
        source: Option<ArticleValidationError>,
    },
}

impl SourceError {
    /// Path of the directory or file that failed.
    pub fn path(&self) -> &Path {
        match self {
            Self::ListDirectory { path, .. }
            | Self::ReadFile { path, .. }
            | Self::Metadata { path, .. }
            | Self::InvalidName { path, .. } => path,
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ListDirectory { path, source } => {
                write!(f, "cannot list directory `{}`: {source}", path.display())
            }
            Self::ReadFile { path, source } => {
                write!(f, "cannot read `{}`: {source}", path.display())
            }
            Self::Metadata { path, source } => {
                write!(f, "cannot stat `{}`: {source}", path.display())
            }
            Self::InvalidName { path, source } => match source {
                Some(err) => write!(f, "invalid article file `{}`: {err}", path.display()),
                None => write!(f, "`{}` is not a markdown source", path.display()),
            },
        }
    }
}

impl Error for SourceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ListDirectory { source, .. }
            | Self::ReadFile { source, .. }
            | Self::Metadata { source, .. } => Some(source),
            Self::InvalidName {
                source: Some(err), ..
            } => Some(err),
            Self::InvalidName { source: None, .. } => None,
        }
    }
}

/// Lists markdown source files directly inside `dir`.
///
/// Entries are returned joined with `dir`, in directory-listing order.
/// Directories, symlinks and other non-regular entries are skipped, as are
/// names without the `.md` suffix or names that are not valid UTF-8.
///
/// # Errors
/// - Returns `SourceError::ListDirectory` when `dir` or one of its entries
///   cannot be read.
pub fn list_markdown_files(dir: impl AsRef<Path>) -> SourceResult<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let list_error = |source| SourceError::ListDirectory {
        path: dir.to_path_buf(),
        source,
    };

    let entries = std::fs::read_dir(dir).map_err(list_error)?;
    let mut files = Vec::new();

    for entry in entries {
        let entry = entry.map_err(list_error)?;
        let file_type = entry.file_type().map_err(list_error)?;
        let file_name = entry.file_name();

        let Some(name) = file_name.to_str() else {
            debug!(
                "event=source_scan module=source status=skip reason=non_utf8_name path={}",
                entry.path().display()
            );
            continue;
        };

        if file_type.is_file() && name.ends_with(MARKDOWN_SUFFIX) {
            files.push(dir.join(name));
        }
    }

    Ok(files)
}

/// Reads one markdown source file into an article.
///
/// `updated_at` is stamped with the file modification time; `created_at` is
/// left for the store to decide. Invalid UTF-8 sequences are replaced rather
/// than rejected.
///
/// # Errors
/// - `SourceError::InvalidName` when the file name has no `.md` suffix or the
///   derived name is invalid.
/// - `SourceError::ReadFile` / `SourceError::Metadata` on I/O failures.
pub fn load_article_from_file(path: impl AsRef<Path>) -> SourceResult<Article> {
    let path = path.as_ref();
    let name = article_name_for_path(path)?;

    let data = std::fs::read(path).map_err(|source| SourceError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    let modified = std::fs::metadata(path)
        .and_then(|metadata| metadata.modified())
        .map_err(|source| SourceError::Metadata {
            path: path.to_path_buf(),
            source,
        })?;

    let source = String::from_utf8_lossy(&data);
    let mut article = Article::from_markdown(name, &source);
    article.updated_at = Some(epoch_ms(modified));
    Ok(article)
}

fn article_name_for_path(path: &Path) -> SourceResult<String> {
    let name = path
        .file_name()
        .and_then(|file_name| file_name.to_str())
        .and_then(article_name_from_file_name)
        .ok_or_else(|| SourceError::InvalidName {
            path: path.to_path_buf(),
            source: None,
        })?;

    crate::model::article::validate_name(name).map_err(|err| SourceError::InvalidName {
        path: path.to_path_buf(),
        source: Some(err),
    })?;
    Ok(name.to_string())
}
