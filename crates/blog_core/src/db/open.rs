//! Connection bootstrap.
//!
//! # Invariants
//! - Returned connections have migrations fully applied.
//! - Every open attempt emits one `db_open` start event and one outcome event.

use super::migrations::apply_migrations;
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens the article database file, creating it when missing, and applies
/// all pending migrations.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    let started_at = Instant::now();
    info!(
        "event=db_open module=db status=start mode=file path={}",
        path.display()
    );

    let outcome = Connection::open(path)
        .map_err(|source| DbError::Open {
            path: path.to_path_buf(),
            source,
        })
        .and_then(bootstrap);
    log_outcome("file", started_at, outcome)
}

/// Opens a private in-memory article database with all migrations applied.
pub fn open_db_in_memory() -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode=memory");

    let outcome = Connection::open_in_memory()
        .map_err(DbError::from)
        .and_then(bootstrap);
    log_outcome("memory", started_at, outcome)
}

fn bootstrap(mut conn: Connection) -> DbResult<Connection> {
    conn.busy_timeout(BUSY_TIMEOUT)?;
    let applied = apply_migrations(&mut conn)?;
    if applied > 0 {
        info!("event=db_bootstrap module=db status=ok migrations_applied={applied}");
    }
    Ok(conn)
}

fn log_outcome(
    mode: &'static str,
    started_at: Instant,
    outcome: DbResult<Connection>,
) -> DbResult<Connection> {
    let duration_ms = started_at.elapsed().as_millis();
    match &outcome {
        Ok(_) => info!("event=db_open module=db status=ok mode={mode} duration_ms={duration_ms}"),
        Err(err) => error!(
            "event=db_open module=db status=error mode={mode} duration_ms={duration_ms} error={err}"
        ),
    }
    outcome
}
