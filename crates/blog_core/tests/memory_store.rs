use blog_core::{
    refresh_once, spawn_refresh_loop, ArticleStore, MemoryArticleStore, ReconcileReport,
    StoreError,
};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn write(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
}

#[test]
fn new_store_serves_empty_snapshot() {
    let store = MemoryArticleStore::new();

    assert!(store.snapshot().is_empty());
    assert_eq!(store.last_refresh(), None);
    assert!(store.list().unwrap().is_empty());
    assert_eq!(store.get_by_name("anything").unwrap(), None);
}

#[test]
fn refresh_loads_every_markdown_file() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "hello.md", "# Hello World\nBody text.");
    write(dir.path(), "notes.md", "Just text.");
    write(dir.path(), "skip.txt", "# Not an article");

    let store = MemoryArticleStore::new();
    let report = store.refresh(dir.path()).unwrap();

    assert_eq!(
        report,
        ReconcileReport {
            scanned: 2,
            created: 2,
            updated: 0,
            skipped: 0,
        }
    );
    let hello = store.get_by_name("hello").unwrap().unwrap();
    assert_eq!(hello.title, "Hello World");
    assert_eq!(hello.content, "<p>Body text.</p>\n");
    assert_eq!(hello.created_at, hello.updated_at);
    assert!(store.get_by_name("skip").unwrap().is_none());
    assert!(store.last_refresh().is_some());
}

#[test]
fn repeated_refresh_is_idempotent_and_keeps_created_at() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "post.md", "# First\n");

    let store = MemoryArticleStore::new();
    store.refresh(dir.path()).unwrap();
    let first = store.get_by_name("post").unwrap().unwrap();

    write(dir.path(), "post.md", "# Second\n");
    let report = store.refresh(dir.path()).unwrap();
    assert_eq!(report.created, 0);
    assert_eq!(report.updated, 1);

    let second = store.get_by_name("post").unwrap().unwrap();
    assert_eq!(second.title, "Second");
    assert_eq!(second.created_at, first.created_at);
    assert!(second.updated_at >= first.updated_at);
    assert_eq!(store.list().unwrap().len(), 1);
}

#[test]
fn removed_files_disappear_on_next_refresh() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "keep.md", "keep");
    write(dir.path(), "drop.md", "drop");

    let store = MemoryArticleStore::new();
    store.refresh(dir.path()).unwrap();
    fs::remove_file(dir.path().join("drop.md")).unwrap();
    store.refresh(dir.path()).unwrap();

    assert!(store.get_by_name("drop").unwrap().is_none());
    assert!(store.get_by_name("keep").unwrap().is_some());
}

#[test]
fn unloadable_file_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "good.md", "# Good");
    write(dir.path(), ".md", "# Nameless");

    let store = MemoryArticleStore::new();
    let report = store.refresh(dir.path()).unwrap();

    assert_eq!(report.scanned, 2);
    assert_eq!(report.created, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(store.snapshot().len(), 1);
}

#[test]
fn failed_listing_keeps_previous_snapshot() {
    let root = tempfile::tempdir().unwrap();
    let dir = root.path().join("articles");
    fs::create_dir(&dir).unwrap();
    write(&dir, "a.md", "# A");

    let store = MemoryArticleStore::new();
    store.refresh(&dir).unwrap();
    let before = store.snapshot();

    fs::remove_dir_all(&dir).unwrap();
    let err = store.refresh(&dir).unwrap_err();
    assert!(matches!(err, StoreError::Source(_)));

    let after = store.snapshot();
    assert!(Arc::ptr_eq(&before, &after));
    assert!(store.get_by_name("a").unwrap().is_some());
    assert!(!refresh_once(&store, &dir));
}

#[test]
fn readers_never_observe_partial_snapshots() {
    const NAMES: [&str; 4] = ["a", "b", "c", "d"];
    const GENERATIONS: usize = 20;

    fn write_generation(dir: &Path, generation: usize) {
        for name in NAMES {
            write(
                dir,
                &format!("{name}.md"),
                &format!("# {name}\n\ngen-{generation}\n"),
            );
        }
    }

    let dir = tempfile::tempdir().unwrap();
    write_generation(dir.path(), 0);

    let store = Arc::new(MemoryArticleStore::new());
    store.refresh(dir.path()).unwrap();
    let writer_done = Arc::new(AtomicBool::new(false));

    let readers = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            let writer_done = Arc::clone(&writer_done);
            thread::spawn(move || loop {
                let finished = writer_done.load(Ordering::Acquire);
                let snapshot = store.snapshot();
                assert_eq!(snapshot.len(), NAMES.len());

                let first = &snapshot.get(NAMES[0]).unwrap().content;
                assert!(first.starts_with("<p>gen-"), "unexpected body {first}");
                for name in NAMES {
                    let article = snapshot.get(name).unwrap();
                    assert_eq!(article.raw_title, name);
                    assert_eq!(&article.content, first, "mixed generations in one snapshot");
                }
                if finished {
                    break;
                }
            })
        })
        .collect::<Vec<_>>();

    for generation in 1..=GENERATIONS {
        write_generation(dir.path(), generation);
        store.refresh(dir.path()).unwrap();
    }
    writer_done.store(true, Ordering::Release);
    for reader in readers {
        reader.join().unwrap();
    }

    let last = store.snapshot();
    assert_eq!(
        last.get("d").unwrap().content,
        format!("<p>gen-{GENERATIONS}</p>\n")
    );
}

#[test]
fn publish_timestamps_survive_export_import_and_refresh() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "old.md", "# Old");
    write(dir.path(), "new.md", "# New");

    let store = MemoryArticleStore::new();
    store.refresh(dir.path()).unwrap();

    let touched = store
        .import_publish_timestamps(br#"{"old": {"created_at": 42, "updated_at": 43}, "gone": {"created_at": 1}}"#)
        .unwrap();
    assert_eq!(touched, 1);

    let old = store.get_by_name("old").unwrap().unwrap();
    assert_eq!(old.created_at, Some(42));
    assert!(old.updated_at.unwrap() > 43);

    store.refresh(dir.path()).unwrap();
    assert_eq!(
        store.get_by_name("old").unwrap().unwrap().created_at,
        Some(42)
    );

    let exported = store.export_publish_timestamps().unwrap();
    let restored = MemoryArticleStore::new();
    restored.refresh(dir.path()).unwrap();
    assert_eq!(restored.import_publish_timestamps(&exported).unwrap(), 2);
    assert_eq!(
        restored.get_by_name("old").unwrap().unwrap().created_at,
        Some(42)
    );
}

#[test]
fn malformed_timestamps_leave_snapshot_untouched() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.md", "# A");

    let store = MemoryArticleStore::new();
    store.refresh(dir.path()).unwrap();
    let before = store.snapshot();

    let err = store.import_publish_timestamps(b"not json").unwrap_err();
    assert!(matches!(err, StoreError::Timestamps(_)));
    assert!(Arc::ptr_eq(&before, &store.snapshot()));
}

#[test]
fn refresh_loop_populates_store_in_background() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "bg.md", "# Background");

    let store = Arc::new(MemoryArticleStore::new());
    spawn_refresh_loop(
        Arc::clone(&store),
        dir.path().to_path_buf(),
        Duration::from_millis(10),
    )
    .unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    while store.get_by_name("bg").unwrap().is_none() {
        assert!(Instant::now() < deadline, "refresh loop never ran");
        thread::sleep(Duration::from_millis(5));
    }

    write(dir.path(), "late.md", "# Late");
    while store.get_by_name("late").unwrap().is_none() {
        assert!(Instant::now() < deadline, "refresh loop stopped");
        thread::sleep(Duration::from_millis(5));
    }
}
