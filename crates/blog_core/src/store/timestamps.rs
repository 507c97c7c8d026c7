//! Publish timestamp export/import format.
//!
//! The payload is a JSON object keyed by article name:
//! `{"hello": {"created_at": 1700000000000, "updated_at": 1700000360000}}`.

use crate::model::article::Article;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Creation and update time of one published article, epoch milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishTimestamp {
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
}

impl PublishTimestamp {
    /// Overwrites `created_at` and keeps the later `updated_at`.
    pub fn apply_to(&self, article: &mut Article) {
        if self.created_at.is_some() {
            article.created_at = self.created_at;
        }
        article.updated_at = match (article.updated_at, self.updated_at) {
            (Some(current), Some(imported)) => Some(current.max(imported)),
            (current, imported) => current.or(imported),
        };
    }
}

pub(crate) fn encode(
    entries: impl IntoIterator<Item = (String, PublishTimestamp)>,
) -> serde_json::Result<Vec<u8>> {
    let map: BTreeMap<String, PublishTimestamp> = entries.into_iter().collect();
    serde_json::to_vec_pretty(&map)
}

pub(crate) fn decode(data: &[u8]) -> serde_json::Result<BTreeMap<String, PublishTimestamp>> {
    serde_json::from_slice(data)
}
