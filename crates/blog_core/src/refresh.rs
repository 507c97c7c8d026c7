//! Background refresh loop.
//!
//! # Responsibility
//! - Re-run store reconciliation on a fixed interval on a dedicated thread.
//!
//! # Invariants
//! - A failed run is logged and the store keeps serving its previous state.
//! - The loop has no stop signal; it ends with the process. An in-flight run
//!   is never interrupted mid-file.

use crate::store::ArticleStore;
use log::{debug, error};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

const REFRESH_THREAD_NAME: &str = "article-refresh";

/// Runs one reconciliation and logs its outcome.
///
/// Returns `true` when the run succeeded.
pub fn refresh_once<S: ArticleStore + ?Sized>(store: &S, dir: &Path) -> bool {
    match store.reconcile_from_directory(dir) {
        Ok(report) => {
            debug!(
                "event=refresh_tick module=refresh status=ok scanned={} skipped={}",
                report.scanned, report.skipped
            );
            true
        }
        Err(err) => {
            error!(
                "event=refresh_tick module=refresh status=error dir={} error={}",
                dir.display(),
                err
            );
            false
        }
    }
}

/// Spawns the refresh thread: reconcile immediately, then once per
/// `interval`.
///
/// # Errors
/// - Returns the OS error when the thread cannot be spawned.
pub fn spawn_refresh_loop<S>(
    store: Arc<S>,
    dir: PathBuf,
    interval: Duration,
) -> io::Result<JoinHandle<()>>
where
    S: ArticleStore + Send + Sync + 'static,
{
    thread::Builder::new()
        .name(REFRESH_THREAD_NAME.to_string())
        .spawn(move || loop {
            refresh_once(store.as_ref(), &dir);
            thread::sleep(interval);
        })
}
