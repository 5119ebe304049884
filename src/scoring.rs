//! Scoring engine - monotonic-improvement leaderboard writes
//!
//! Scores a passing submission by source length (characters, lower is
//! better) and applies it to the hero table through the store's atomic
//! conditional upsert. A stored score only ever decreases; a non-improving
//! score is logged and discarded without touching the row.

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::StorageError;
use crate::store::{Consent, Store, UpsertOutcome};
use crate::usernames;

/// What the scoring engine decided about a passing submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoreDecision {
    /// First score for this identity; a display name was assigned.
    FirstScore { nick: String },
    /// Candidate beat the stored best.
    Improved { nick: String, old: u32, new: u32 },
    /// Candidate did not beat the stored best; nothing was stored.
    NotImproved { nick: String, old: u32, new: u32 },
}

impl ScoreDecision {
    pub fn nick(&self) -> &str {
        match self {
            ScoreDecision::FirstScore { nick }
            | ScoreDecision::Improved { nick, .. }
            | ScoreDecision::NotImproved { nick, .. } => nick,
        }
    }
}

/// Exclusive owner of hero-row mutation.
pub struct ScoringEngine {
    store: Arc<dyn Store>,
}

impl ScoringEngine {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Apply a passing submission to the leaderboard.
    ///
    /// The candidate score is the character count of the submitted source.
    /// Identity is keyed by email alone; an improving submission may switch
    /// the stored language. The display name candidate is generated up front
    /// and used only if this turns out to be the identity's first score.
    pub async fn submit_score(
        &self,
        email: &str,
        lang: &str,
        code: &str,
        consent: Consent,
        execution_time: f64,
    ) -> Result<ScoreDecision, StorageError> {
        let new_score = code.chars().count() as u32;
        let nick_candidate = usernames::random_name();

        let outcome = self
            .store
            .upsert_if_better(email, lang, new_score, consent, &nick_candidate)
            .await?;

        Ok(match outcome {
            UpsertOutcome::Created { nick } => {
                info!(
                    "New record[{}, {}] in {:.2}s: - -> {}",
                    email, lang, execution_time, new_score
                );
                ScoreDecision::FirstScore { nick }
            }
            UpsertOutcome::Updated { nick, old_score } => {
                info!(
                    "New record[{}, {}] in {:.2}s: {} -> {}",
                    email, lang, execution_time, old_score, new_score
                );
                ScoreDecision::Improved {
                    nick,
                    old: old_score,
                    new: new_score,
                }
            }
            UpsertOutcome::Unchanged { nick, old_score } => {
                warn!(
                    "Worse record[{}, {}] in {:.2}s: {} -> {}",
                    email, lang, execution_time, old_score, new_score
                );
                ScoreDecision::NotImproved {
                    nick,
                    old: old_score,
                    new: new_score,
                }
            }
        })
    }
}
