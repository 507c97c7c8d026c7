//! Blog runtime configuration.
//!
//! # Responsibility
//! - Load the immutable run configuration from a TOML file.
//! - Supply defaults for every field so a missing file is a valid setup.
//!
//! # Invariants
//! - `refresh_interval_ms` is strictly positive after validation.
//! - Configuration is passed explicitly; it is never stored in globals.

use crate::logging::default_log_level;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Conventional configuration file name inside a blog directory.
pub const CONFIG_FILE_NAME: &str = "blog.toml";

const DEFAULT_ARTICLES_DIR: &str = "articles";
const DEFAULT_DATABASE_PATH: &str = "blog.db";
const DEFAULT_TIMESTAMPS_PATH: &str = "publish_dates.json";
const DEFAULT_REFRESH_INTERVAL_MS: u64 = 5_000;

#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, source: io::Error },
    Parse { path: PathBuf, source: toml::de::Error },
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "cannot read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "cannot parse config `{}`: {source}", path.display())
            }
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Invalid(_) => None,
        }
    }
}

/// Settings for one blog process.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BlogConfig {
    /// Directory holding the `*.md` article sources.
    pub articles_dir: PathBuf,
    /// SQLite file of the persisted store.
    pub database_path: PathBuf,
    /// Publish timestamp export file of the in-memory store.
    pub timestamps_path: PathBuf,
    /// Pause between two background refreshes.
    pub refresh_interval_ms: u64,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Directory for rolling log files; logging stays off when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            articles_dir: PathBuf::from(DEFAULT_ARTICLES_DIR),
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            timestamps_path: PathBuf::from(DEFAULT_TIMESTAMPS_PATH),
            refresh_interval_ms: DEFAULT_REFRESH_INTERVAL_MS,
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl BlogConfig {
    /// Parses and validates configuration text.
    pub fn from_toml_str(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates the file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text, path)
    }

    /// Like [`BlogConfig::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::Read { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Resolves relative paths against `base`.
    pub fn resolve(mut self, base: &Path) -> Self {
        for path in [
            &mut self.articles_dir,
            &mut self.database_path,
            &mut self.timestamps_path,
        ] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
        if let Some(log_dir) = self.log_dir.as_mut().filter(|dir| dir.is_relative()) {
            *log_dir = base.join(&*log_dir);
        }
        self
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.refresh_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "refresh_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.articles_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "articles_dir must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
