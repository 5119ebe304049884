//! Append-only audit log of submission attempts
//!
//! Every submission - accepted, wrong, or rejected before execution - leaves
//! exactly one record here. Records are never updated or deleted; the store
//! assigns a monotonically increasing sequence used for reverse-chronological
//! paging.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::store::Store;

/// Attempt data as handed to the store; the store assigns `seq` and `time`.
#[derive(Debug, Clone)]
pub struct NewAuditRecord {
    pub email: String,
    pub lang: String,
    /// Length of the submitted code, recorded regardless of the verdict
    pub score: u32,
    pub fail: bool,
    /// Wall-clock duration of the whole comparator run, in seconds
    pub execution_time: f64,
}

/// One immutable attempt record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub seq: u64,
    pub email: String,
    pub lang: String,
    pub score: u32,
    pub fail: bool,
    pub execution_time: f64,
    pub time: DateTime<Utc>,
}

/// Append-only writer over the attempt log.
pub struct AuditLog {
    store: Arc<dyn Store>,
}

impl AuditLog {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Record one attempt unconditionally. Called once per submission,
    /// whatever the comparator or scoring engine decided.
    pub async fn record_attempt(
        &self,
        email: &str,
        lang: &str,
        code: &str,
        fail: bool,
        execution_time: f64,
    ) -> Result<u64, StorageError> {
        self.store
            .append_audit(NewAuditRecord {
                email: email.to_string(),
                lang: lang.to_string(),
                score: code.chars().count() as u32,
                fail,
                execution_time,
            })
            .await
    }
}
