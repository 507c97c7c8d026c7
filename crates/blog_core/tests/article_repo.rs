use blog_core::db::open_db_in_memory;
use blog_core::{Article, ArticleRepository, RepoError, SqliteArticleRepository};
use rusqlite::Connection;

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteArticleRepository::try_new(&conn).unwrap();

    let article = Article::from_markdown("hello", "# Hello World\nBody text.");
    let id = repo.create_article(&article).unwrap();

    let by_id = repo.get_article_by_id(id).unwrap().unwrap();
    assert_eq!(by_id.id, Some(id));
    assert_eq!(by_id.name, "hello");
    assert_eq!(by_id.title, "Hello World");
    assert_eq!(by_id.raw_title, "Hello World");
    assert_eq!(by_id.content, "<p>Body text.</p>\n");
    assert!(by_id.created_at.is_some());
    assert_eq!(by_id.created_at, by_id.updated_at);

    let by_name = repo.get_article_by_name("hello").unwrap().unwrap();
    assert_eq!(by_name, by_id);
}

#[test]
fn lookups_of_unknown_keys_return_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteArticleRepository::try_new(&conn).unwrap();

    assert!(repo.get_article_by_name("missing").unwrap().is_none());
    assert!(repo.get_article_by_id(404).unwrap().is_none());
}

#[test]
fn update_rewrites_fields_and_refreshes_updated_at() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteArticleRepository::try_new(&conn).unwrap();

    let id = repo
        .create_article(&Article::from_markdown("post", "# Draft\n"))
        .unwrap();
    conn.execute(
        "UPDATE articles SET created_at = 1000, updated_at = 1000 WHERE id = ?1;",
        [id],
    )
    .unwrap();

    let mut edited = Article::from_markdown("post", "# Final\n\nDone.");
    edited.id = Some(id);
    repo.update_article(&edited).unwrap();

    let loaded = repo.get_article_by_id(id).unwrap().unwrap();
    assert_eq!(loaded.title, "Final");
    assert_eq!(loaded.raw_title, "Final");
    assert_eq!(loaded.content, "<p>Done.</p>\n");
    assert_eq!(loaded.created_at, Some(1000));
    assert!(loaded.updated_at.unwrap() > 1000);
}

#[test]
fn update_requires_an_existing_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteArticleRepository::try_new(&conn).unwrap();

    let mut article = Article::from_markdown("ghost", "");
    let err = repo.update_article(&article).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));

    article.id = Some(77);
    let err = repo.update_article(&article).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(77)));
}

#[test]
fn writes_reject_invalid_names() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteArticleRepository::try_new(&conn).unwrap();

    let article = Article::from_markdown("", "");
    let err = repo.create_article(&article).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
}

#[test]
fn list_orders_newest_first_then_by_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteArticleRepository::try_new(&conn).unwrap();

    for (name, created_at) in [("old", 100), ("mid", 200), ("twin", 200), ("new", 300)] {
        let id = repo
            .create_article(&Article::from_markdown(name, ""))
            .unwrap();
        conn.execute(
            "UPDATE articles SET created_at = ?1 WHERE id = ?2;",
            rusqlite::params![created_at, id],
        )
        .unwrap();
    }

    let names = repo
        .list_articles()
        .unwrap()
        .into_iter()
        .map(|article| article.name)
        .collect::<Vec<_>>();
    assert_eq!(names, ["new", "twin", "mid", "old"]);
}

#[test]
fn delete_removes_row_and_reports_missing_ids() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteArticleRepository::try_new(&conn).unwrap();

    let id = repo
        .create_article(&Article::from_markdown("temp", ""))
        .unwrap();
    repo.delete_article(id).unwrap();

    assert!(repo.get_article_by_id(id).unwrap().is_none());
    assert!(matches!(
        repo.delete_article(id).unwrap_err(),
        RepoError::NotFound(found) if found == id
    ));
}

#[test]
fn duplicate_names_resolve_to_lowest_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteArticleRepository::try_new(&conn).unwrap();

    let first = repo
        .create_article(&Article::from_markdown("dup", "# One"))
        .unwrap();
    repo.create_article(&Article::from_markdown("dup", "# Two"))
        .unwrap();

    let found = repo.get_article_by_name("dup").unwrap().unwrap();
    assert_eq!(found.id, Some(first));
    assert_eq!(found.title, "One");
}

#[test]
fn try_new_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let err = SqliteArticleRepository::try_new(&conn).err().unwrap();
    assert!(matches!(
        err,
        RepoError::UninitializedConnection {
            actual_version: 0,
            ..
        }
    ));
}

#[test]
fn try_new_rejects_missing_table_and_columns() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch("DROP TABLE articles;").unwrap();
    let err = SqliteArticleRepository::try_new(&conn).err().unwrap();
    assert!(matches!(err, RepoError::MissingRequiredTable("articles")));

    conn.execute_batch(
        "CREATE TABLE articles (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );",
    )
    .unwrap();
    let err = SqliteArticleRepository::try_new(&conn).err().unwrap();
    assert!(matches!(
        err,
        RepoError::MissingRequiredColumn {
            table: "articles",
            column: "raw_title",
        }
    ));
}
