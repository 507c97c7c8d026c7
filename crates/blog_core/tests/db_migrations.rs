use blog_core::db::migrations::{current_user_version, latest_version};
use blog_core::db::{open_db, open_db_in_memory, table_columns, table_exists, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(current_user_version(&conn).unwrap(), latest_version());
    assert!(table_exists(&conn, "articles").unwrap());
    assert_eq!(
        table_columns(&conn, "articles").unwrap(),
        [
            "id",
            "name",
            "title",
            "raw_title",
            "content",
            "created_at",
            "updated_at"
        ]
    );
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blog.db");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute(
            "INSERT INTO articles (name, title, content) VALUES ('a', 'A', '');",
            [],
        )
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(current_user_version(&conn_second).unwrap(), latest_version());
    let rows: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM articles;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn column_defaults_stamp_epoch_milliseconds() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO articles (name, title, content) VALUES ('a', 'A', '');",
        [],
    )
    .unwrap();

    let (created_at, updated_at): (i64, i64) = conn
        .query_row(
            "SELECT created_at, updated_at FROM articles WHERE name = 'a';",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    // 2020-01-01T00:00:00Z
    assert!(created_at > 1_577_836_800_000);
    assert!(updated_at >= created_at - 1);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}
