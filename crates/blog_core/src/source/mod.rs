//! Article source files on disk.
//!
//! # Responsibility
//! - List candidate markdown files of an articles directory.
//! - Load one source file into an [`Article`](crate::model::article::Article).
//!
//! # Invariants
//! - Only regular files with the case-sensitive `.md` suffix are sources.
//! - Listing never recurses into subdirectories.

pub mod scanner;
