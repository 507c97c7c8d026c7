//! Command-line entry point.
//!
//! # Responsibility
//! - Wire configuration, logging and the core stores for local runs.
//! - Keep output plain and line-oriented.
//!
//! Usage: `blog <command> [dir]` where command is one of
//! `init`, `sync`, `watch`, `version`.

use blog_core::db::open_db;
use blog_core::{
    init_logging_from_config, init_project_tree, spawn_refresh_loop, ArticleStore,
    ArticleSyncService, BlogConfig, MemoryArticleStore, SqliteArticleRepository,
};
use log::warn;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::thread;

const USAGE: &[&str] = &[
    "usage: blog <command> [dir]",
    "",
    "commands:",
    "  init [dir]     create templates/, articles/ and static/ in dir",
    "  sync [dir]     upsert dir's articles into the SQLite store once",
    "  watch [dir]    keep an in-memory article cache refreshed",
    "  version        print the core version",
];

fn main() -> ExitCode {
    let mut args = std::env::args().skip(1);
    let Some(command) = args.next() else {
        print_usage();
        return ExitCode::FAILURE;
    };
    let base_dir = args.next().map_or_else(|| PathBuf::from("."), PathBuf::from);

    let outcome = match command.as_str() {
        "init" => run_init(&base_dir),
        "sync" => run_sync(&base_dir),
        "watch" => run_watch(&base_dir),
        "version" => {
            println!("blog_core version={}", blog_core::core_version());
            Ok(())
        }
        _ => {
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn print_usage() {
    for line in USAGE {
        println!("{line}");
    }
}

fn load_config(base_dir: &Path) -> Result<BlogConfig, Box<dyn Error>> {
    let base_dir = std::env::current_dir()?.join(base_dir);
    let config = BlogConfig::load_or_default(base_dir.join(blog_core::config::CONFIG_FILE_NAME))?
        .resolve(&base_dir);
    init_logging_from_config(&config)?;
    Ok(config)
}

fn run_init(base_dir: &Path) -> Result<(), Box<dyn Error>> {
    let report = init_project_tree(base_dir)?;
    for path in &report.written {
        println!("create {}", path.display());
    }
    for path in &report.kept {
        println!("keep {}", path.display());
    }
    Ok(())
}

fn run_sync(base_dir: &Path) -> Result<(), Box<dyn Error>> {
    let config = load_config(base_dir)?;
    let conn = open_db(&config.database_path)?;
    let service = ArticleSyncService::new(SqliteArticleRepository::try_new(&conn)?);

    let report = service.reconcile_from_directory(&config.articles_dir)?;
    println!(
        "scanned={} created={} updated={} skipped={}",
        report.scanned, report.created, report.updated, report.skipped
    );
    Ok(())
}

fn run_watch(base_dir: &Path) -> Result<(), Box<dyn Error>> {
    let config = load_config(base_dir)?;
    let store = Arc::new(MemoryArticleStore::new());

    store.refresh(&config.articles_dir)?;
    match std::fs::read(&config.timestamps_path) {
        Ok(data) => {
            let touched = store.import_publish_timestamps(&data)?;
            println!("imported publish dates for {touched} articles");
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => warn!(
            "event=timestamps_import module=cli status=error path={} error={}",
            config.timestamps_path.display(),
            err
        ),
    }

    spawn_refresh_loop(
        Arc::clone(&store),
        config.articles_dir.clone(),
        config.refresh_interval(),
    )?;

    loop {
        thread::sleep(config.refresh_interval());
        let exported = store.export_publish_timestamps()?;
        std::fs::write(&config.timestamps_path, exported)?;
        println!(
            "articles={} last_refresh={}",
            store.snapshot().len(),
            store.last_refresh().unwrap_or_default()
        );
    }
}
