//! Schema migrations for the article database.
//!
//! # Invariants
//! - Migration versions start at 1 and increase by one.
//! - The applied version is mirrored to `PRAGMA user_version` inside the same
//!   transaction as the migration SQL.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "articles",
    sql: include_str!("0001_articles.sql"),
}];

/// Position of a database relative to the migrations this binary knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaState {
    Current,
    /// Older schema; migrations from `version + 1` onwards are pending.
    Behind { version: u32 },
    /// Written by a newer binary.
    Ahead { version: u32 },
}

/// Returns the latest migration version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Reads the schema version recorded in `PRAGMA user_version`.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

pub fn schema_state(conn: &Connection) -> DbResult<SchemaState> {
    let version = current_user_version(conn)?;
    Ok(match version.cmp(&latest_version()) {
        std::cmp::Ordering::Equal => SchemaState::Current,
        std::cmp::Ordering::Less => SchemaState::Behind { version },
        std::cmp::Ordering::Greater => SchemaState::Ahead { version },
    })
}

/// Brings the schema up to [`latest_version`] in one transaction.
///
/// Returns the number of migrations applied.
///
/// # Errors
/// - `DbError::UnsupportedSchemaVersion` for a schema newer than this binary.
/// - `DbError::Sqlite` when a migration fails; nothing is applied then.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<usize> {
    let from = match schema_state(conn)? {
        SchemaState::Current => return Ok(0),
        SchemaState::Behind { version } => version,
        SchemaState::Ahead { version } => {
            return Err(DbError::UnsupportedSchemaVersion {
                db_version: version,
                latest_supported: latest_version(),
            })
        }
    };

    let pending = MIGRATIONS
        .iter()
        .filter(|migration| migration.version > from)
        .collect::<Vec<_>>();

    let tx = conn.transaction()?;
    for migration in &pending {
        tx.execute_batch(migration.sql)?;
        tx.pragma_update(None, "user_version", migration.version)?;
    }
    tx.commit()?;

    for migration in &pending {
        info!(
            "event=db_migrate module=db status=ok version={} name={}",
            migration.version, migration.name
        );
    }
    Ok(pending.len())
}
