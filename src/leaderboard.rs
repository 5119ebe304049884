//! Leaderboard query - ranked hero views and audit paging
//!
//! Read-only views over the store. Masking and padding happen in the
//! returned view only; stored rows are never touched from here.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::audit::AuditRecord;
use crate::error::StorageError;
use crate::store::Store;

/// Placeholder shown instead of a masked score.
const HIDDEN_SCORE: &str = "???";
/// Placeholder for padded empty rows.
const EMPTY_FIELD: &str = "-";

/// Options for the heroes view.
#[derive(Debug, Clone, Default)]
pub struct HeroQuery {
    /// Truncate the view to this many rows; `None` returns everything.
    pub limit: Option<usize>,
    /// Replace the score of the first N ranked rows with a placeholder.
    pub hide_top: usize,
    /// Pad with empty rows up to `limit` when fewer real entries exist.
    pub pad: bool,
}

/// Score cell of one leaderboard row as shown to the outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreCell {
    Visible(u32),
    Hidden,
    Empty,
}

impl fmt::Display for ScoreCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreCell::Visible(score) => write!(f, "{}", score),
            ScoreCell::Hidden => write!(f, "{}", HIDDEN_SCORE),
            ScoreCell::Empty => write!(f, "{}", EMPTY_FIELD),
        }
    }
}

/// One row of the heroes view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeroRow {
    pub nick: String,
    pub lang: String,
    pub score: ScoreCell,
    pub time: Option<DateTime<Utc>>,
}

impl HeroRow {
    fn empty() -> Self {
        Self {
            nick: EMPTY_FIELD.to_string(),
            lang: EMPTY_FIELD.to_string(),
            score: ScoreCell::Empty,
            time: None,
        }
    }
}

/// One page of the audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditPage {
    pub records: Vec<AuditRecord>,
    pub total: usize,
    /// The page actually served, after clamping
    pub page: usize,
    pub total_pages: usize,
}

/// Read views over heroes and the attempt log.
pub struct Leaderboard {
    store: Arc<dyn Store>,
}

impl Leaderboard {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Ranked hero rows, best score first, earliest update breaking ties.
    pub async fn heroes(&self, query: &HeroQuery) -> Result<Vec<HeroRow>, StorageError> {
        let mut heroes = self.store.all_heroes().await?;
        if let Some(limit) = query.limit {
            heroes.truncate(limit);
        }

        let mut rows: Vec<HeroRow> = heroes
            .into_iter()
            .enumerate()
            .map(|(rank, hero)| HeroRow {
                nick: hero.nick,
                lang: hero.lang,
                score: if rank < query.hide_top {
                    ScoreCell::Hidden
                } else {
                    ScoreCell::Visible(hero.score)
                },
                time: Some(hero.time),
            })
            .collect();

        if query.pad {
            if let Some(limit) = query.limit {
                while rows.len() < limit {
                    rows.push(HeroRow::empty());
                }
            }
        }

        Ok(rows)
    }

    /// One reverse-chronological page of the attempt log. The requested page
    /// is clamped to `[1, ceil(total / page_size)]`.
    pub async fn audit_page(
        &self,
        page: usize,
        page_size: usize,
    ) -> Result<AuditPage, StorageError> {
        let page_size = page_size.max(1);
        let total = self.store.audit_count().await?;
        let total_pages = (total.div_ceil(page_size)).max(1);
        let page = page.clamp(1, total_pages);

        let records = self
            .store
            .audit_window((page - 1) * page_size, page_size)
            .await?;

        Ok(AuditPage {
            records,
            total,
            page,
            total_pages,
        })
    }

    /// Display name for an identity, or the stock placeholder for a player
    /// without a score yet.
    pub async fn display_name(&self, email: &str) -> Result<String, StorageError> {
        Ok(self
            .store
            .get_hero(email)
            .await?
            .map(|hero| hero.nick)
            .unwrap_or_else(|| "not here yet".to_string()))
    }
}
