//! Blog project scaffolding.
//!
//! # Responsibility
//! - Create the directory layout a blog process expects.
//! - Seed default templates and stylesheet without clobbering user files.

use log::{error, info};
use std::io;
use std::path::{Path, PathBuf};

const PROJECT_DIRS: &[&str] = &["templates", "articles", "static"];

const DEFAULT_FILES: &[(&str, &str)] = &[
    ("templates/index.html", include_str!("../assets/index.html")),
    (
        "templates/article.html",
        include_str!("../assets/article.html"),
    ),
    ("static/style.css", include_str!("../assets/style.css")),
];

/// Paths touched by [`init_project_tree`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectInitReport {
    /// Default files written by this call.
    pub written: Vec<PathBuf>,
    /// Default files left alone because they already existed.
    pub kept: Vec<PathBuf>,
}

/// Creates `templates/`, `articles/` and `static/` under `base_dir` and
/// writes the default files that do not exist yet.
///
/// # Errors
/// - Returns the first I/O error; earlier directories/files stay created.
pub fn init_project_tree(base_dir: impl AsRef<Path>) -> io::Result<ProjectInitReport> {
    let base_dir = base_dir.as_ref();
    let mut report = ProjectInitReport::default();

    for dir in PROJECT_DIRS {
        let path = base_dir.join(dir);
        std::fs::create_dir_all(&path).inspect_err(|err| {
            error!(
                "event=project_init module=project status=error path={} error={}",
                path.display(),
                err
            );
        })?;
    }

    for (relative, contents) in DEFAULT_FILES {
        let path = base_dir.join(relative);
        if path.exists() {
            report.kept.push(path);
            continue;
        }
        std::fs::write(&path, contents).inspect_err(|err| {
            error!(
                "event=project_init module=project status=error path={} error={}",
                path.display(),
                err
            );
        })?;
        info!(
            "event=project_init module=project status=ok action=create path={}",
            path.display()
        );
        report.written.push(path);
    }

    Ok(report)
}
