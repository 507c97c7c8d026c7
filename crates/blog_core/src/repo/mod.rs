//! Repository layer over the persisted article table.
//!
//! # Responsibility
//! - Define the CRUD contract the persisted store relies on.
//! - Isolate SQLite query details from reconciliation logic.
//!
//! # Invariants
//! - Repository writes enforce `Article::validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod article_repo;
