//! Submission pipeline - validate, compare, score, audit
//!
//! Ties the comparator, scoring engine, audit log and leaderboard together.
//! Each submission runs the full pipeline to completion on its own task;
//! every path leaves exactly one audit record.

use std::sync::Arc;
use std::time::Instant;

use tracing::warn;

use crate::audit::AuditLog;
use crate::comparator::{Comparator, Diagnostic};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::leaderboard::Leaderboard;
use crate::runner::Runner;
use crate::scoring::ScoringEngine;
use crate::store::{Consent, Store};
use crate::task::Task;

/// One submission attempt as handed in by the request layer, which has
/// already checked the email shape and non-empty language.
#[derive(Debug, Clone)]
pub struct Submission {
    pub email: String,
    pub language: String,
    pub code: String,
    pub consent: Consent,
}

/// Verdict returned to the caller.
///
/// A passing submission is `Accepted` whether or not it improved the stored
/// best; the leaderboard is selective, the contest rules are not.
#[derive(Debug, Clone)]
pub enum SubmissionOutcome {
    Accepted { display_name: String },
    Rejected(Diagnostic),
}

/// The full submission pipeline for one contest instance.
pub struct SubmissionPipeline {
    comparator: Comparator,
    scoring: ScoringEngine,
    audit: AuditLog,
    leaderboard: Leaderboard,
}

impl SubmissionPipeline {
    pub fn new(
        task: Arc<dyn Task>,
        runner: Arc<dyn Runner>,
        store: Arc<dyn Store>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            comparator: Comparator::new(task, runner, config.max_concurrent_runs),
            scoring: ScoringEngine::new(store.clone()),
            audit: AuditLog::new(store.clone()),
            leaderboard: Leaderboard::new(store),
        }
    }

    /// Judge one submission end to end.
    pub async fn submit(&self, submission: Submission) -> Result<SubmissionOutcome, EngineError> {
        // Textareas submit CRLF; normalize before the length counts.
        let code = submission.code.replace("\r\n", "\n");
        let started = Instant::now();

        if let Err(diagnostic) = self
            .comparator
            .evaluate(&submission.language, &code)
            .await
        {
            let execution_time = started.elapsed().as_secs_f64();
            warn!(
                "Fail[{}, {}] in {:.2}s",
                submission.email, submission.language, execution_time
            );
            self.audit
                .record_attempt(
                    &submission.email,
                    &submission.language,
                    &code,
                    true,
                    execution_time,
                )
                .await
                .map_err(EngineError::Audit)?;
            return Ok(SubmissionOutcome::Rejected(diagnostic));
        }

        let execution_time = started.elapsed().as_secs_f64();

        // Score and audit writes are independent; attempt both and report
        // each failure on its own.
        let score_result = self
            .scoring
            .submit_score(
                &submission.email,
                &submission.language,
                &code,
                submission.consent,
                execution_time,
            )
            .await;
        let audit_result = self
            .audit
            .record_attempt(
                &submission.email,
                &submission.language,
                &code,
                false,
                execution_time,
            )
            .await;

        match (score_result, audit_result) {
            (Ok(decision), Ok(_)) => Ok(SubmissionOutcome::Accepted {
                display_name: decision.nick().to_string(),
            }),
            (Err(score), Ok(_)) => Err(EngineError::Score(score)),
            (Ok(_), Err(audit)) => Err(EngineError::Audit(audit)),
            (Err(score), Err(audit)) => Err(EngineError::ScoreAndAudit { score, audit }),
        }
    }

    /// Read views over the same store this pipeline writes to.
    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }
}
