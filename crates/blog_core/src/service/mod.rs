//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate source loading and repository calls into reconciliation.
//! - Keep CLI/presentation callers decoupled from storage details.

pub mod sync_service;
