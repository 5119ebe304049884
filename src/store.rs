//! Persistence layer - heroes table and append-only audit log
//!
//! Two logical tables: current-best entries keyed by email (with secondary
//! lookup by display name) and an append-only attempt log keyed by a
//! monotonically increasing sequence. The score compare-and-write happens
//! inside the store so concurrent submissions from one identity cannot race
//! to a lost update; a SQL-backed implementation would use a conditional
//! `UPDATE ... WHERE score > :candidate` for the same guarantee.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::audit::{AuditRecord, NewAuditRecord};
use crate::error::StorageError;

/// Consent flags captured with a submission and stored on the hero row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consent {
    pub contest: bool,
    pub marketing: bool,
}

/// A current-best leaderboard entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hero {
    pub email: String,
    pub nick: String,
    pub lang: String,
    /// Source length in characters; lower is better
    pub score: u32,
    pub consent: Consent,
    /// Last accepted update
    pub time: DateTime<Utc>,
}

/// Result of the conditional score upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// No prior entry; a new hero row was created with `nick`.
    Created { nick: String },
    /// Candidate beat the stored score; the row was overwritten.
    Updated { nick: String, old_score: u32 },
    /// Candidate did not beat the stored score; nothing was mutated.
    Unchanged { nick: String, old_score: u32 },
}

/// Storage contract for the scoring engine, audit log and leaderboard.
#[async_trait]
pub trait Store: Send + Sync {
    async fn get_hero(&self, email: &str) -> Result<Option<Hero>, StorageError>;

    async fn get_hero_by_nick(&self, nick: &str) -> Result<Option<Hero>, StorageError>;

    /// Atomic compare-and-write of a candidate score. `nick_candidate` is
    /// used only when no row exists yet; an existing row keeps its nick.
    async fn upsert_if_better(
        &self,
        email: &str,
        lang: &str,
        score: u32,
        consent: Consent,
        nick_candidate: &str,
    ) -> Result<UpsertOutcome, StorageError>;

    /// All hero rows ordered by (score ascending, earliest update first).
    async fn all_heroes(&self) -> Result<Vec<Hero>, StorageError>;

    /// Append one attempt record, returning its assigned sequence number.
    async fn append_audit(&self, record: NewAuditRecord) -> Result<u64, StorageError>;

    /// Audit records in reverse insertion order, windowed by offset/limit.
    async fn audit_window(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<AuditRecord>, StorageError>;

    async fn audit_count(&self) -> Result<usize, StorageError>;
}

/// In-memory store. The heroes mutex is held across the compare-and-write in
/// `upsert_if_better`, which is what makes the monotonic-improvement check
/// atomic per identity.
#[derive(Default)]
pub struct MemoryStore {
    heroes: Mutex<HashMap<String, Hero>>,
    audit: Mutex<Vec<AuditRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_hero(&self, email: &str) -> Result<Option<Hero>, StorageError> {
        Ok(self.heroes.lock().await.get(email).cloned())
    }

    async fn get_hero_by_nick(&self, nick: &str) -> Result<Option<Hero>, StorageError> {
        Ok(self
            .heroes
            .lock()
            .await
            .values()
            .find(|h| h.nick == nick)
            .cloned())
    }

    async fn upsert_if_better(
        &self,
        email: &str,
        lang: &str,
        score: u32,
        consent: Consent,
        nick_candidate: &str,
    ) -> Result<UpsertOutcome, StorageError> {
        let mut heroes = self.heroes.lock().await;
        match heroes.get_mut(email) {
            None => {
                heroes.insert(
                    email.to_string(),
                    Hero {
                        email: email.to_string(),
                        nick: nick_candidate.to_string(),
                        lang: lang.to_string(),
                        score,
                        consent,
                        time: Utc::now(),
                    },
                );
                Ok(UpsertOutcome::Created {
                    nick: nick_candidate.to_string(),
                })
            }
            Some(hero) if score < hero.score => {
                let old_score = hero.score;
                hero.score = score;
                hero.lang = lang.to_string();
                hero.consent = consent;
                hero.time = Utc::now();
                Ok(UpsertOutcome::Updated {
                    nick: hero.nick.clone(),
                    old_score,
                })
            }
            Some(hero) => Ok(UpsertOutcome::Unchanged {
                nick: hero.nick.clone(),
                old_score: hero.score,
            }),
        }
    }

    async fn all_heroes(&self) -> Result<Vec<Hero>, StorageError> {
        let mut heroes: Vec<Hero> = self.heroes.lock().await.values().cloned().collect();
        heroes.sort_by(|a, b| a.score.cmp(&b.score).then(a.time.cmp(&b.time)));
        Ok(heroes)
    }

    async fn append_audit(&self, record: NewAuditRecord) -> Result<u64, StorageError> {
        let mut audit = self.audit.lock().await;
        let seq = audit.len() as u64 + 1;
        audit.push(AuditRecord {
            seq,
            email: record.email,
            lang: record.lang,
            score: record.score,
            fail: record.fail,
            execution_time: record.execution_time,
            time: Utc::now(),
        });
        Ok(seq)
    }

    async fn audit_window(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<AuditRecord>, StorageError> {
        let audit = self.audit.lock().await;
        Ok(audit
            .iter()
            .rev()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn audit_count(&self) -> Result<usize, StorageError> {
        Ok(self.audit.lock().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn consent() -> Consent {
        Consent {
            contest: true,
            marketing: false,
        }
    }

    #[tokio::test]
    async fn test_upsert_creates_then_only_improves() {
        let store = MemoryStore::new();
        let outcome = store
            .upsert_if_better("a@b.c", "python", 50, consent(), "brave otter")
            .await
            .unwrap();
        assert_eq!(
            outcome,
            UpsertOutcome::Created {
                nick: "brave otter".into()
            }
        );

        // Worse score leaves the row untouched, even with a new nick candidate.
        let outcome = store
            .upsert_if_better("a@b.c", "bash", 80, consent(), "sly viper")
            .await
            .unwrap();
        assert_eq!(
            outcome,
            UpsertOutcome::Unchanged {
                nick: "brave otter".into(),
                old_score: 50
            }
        );
        let hero = store.get_hero("a@b.c").await.unwrap().unwrap();
        assert_eq!(hero.score, 50);
        assert_eq!(hero.lang, "python");

        let outcome = store
            .upsert_if_better("a@b.c", "bash", 30, consent(), "sly viper")
            .await
            .unwrap();
        assert_eq!(
            outcome,
            UpsertOutcome::Updated {
                nick: "brave otter".into(),
                old_score: 50
            }
        );
        let hero = store.get_hero("a@b.c").await.unwrap().unwrap();
        assert_eq!(hero.score, 30);
        assert_eq!(hero.lang, "bash");
        assert_eq!(hero.nick, "brave otter");
    }

    #[tokio::test]
    async fn test_equal_score_is_not_an_improvement() {
        let store = MemoryStore::new();
        store
            .upsert_if_better("a@b.c", "python", 40, consent(), "keen gecko")
            .await
            .unwrap();
        let outcome = store
            .upsert_if_better("a@b.c", "python", 40, consent(), "keen gecko")
            .await
            .unwrap();
        assert!(matches!(outcome, UpsertOutcome::Unchanged { old_score: 40, .. }));
    }

    #[tokio::test]
    async fn test_lookup_by_nick() {
        let store = MemoryStore::new();
        store
            .upsert_if_better("a@b.c", "python", 40, consent(), "keen gecko")
            .await
            .unwrap();
        let hero = store.get_hero_by_nick("keen gecko").await.unwrap().unwrap();
        assert_eq!(hero.email, "a@b.c");
        assert!(store.get_hero_by_nick("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_heroes_ordered_by_score_then_time() {
        let store = MemoryStore::new();
        store
            .upsert_if_better("first@x.y", "python", 20, consent(), "a")
            .await
            .unwrap();
        store
            .upsert_if_better("second@x.y", "bash", 20, consent(), "b")
            .await
            .unwrap();
        store
            .upsert_if_better("third@x.y", "perl", 10, consent(), "c")
            .await
            .unwrap();
        let heroes = store.all_heroes().await.unwrap();
        let nicks: Vec<&str> = heroes.iter().map(|h| h.nick.as_str()).collect();
        assert_eq!(nicks, vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn test_audit_append_is_ordered_and_windowed() {
        let store = MemoryStore::new();
        for i in 0..5u32 {
            let seq = store
                .append_audit(NewAuditRecord {
                    email: "a@b.c".into(),
                    lang: "python".into(),
                    score: 40 + i,
                    fail: false,
                    execution_time: 0.1,
                })
                .await
                .unwrap();
            assert_eq!(seq, u64::from(i) + 1);
        }
        assert_eq!(store.audit_count().await.unwrap(), 5);

        let window = store.audit_window(1, 2).await.unwrap();
        let seqs: Vec<u64> = window.iter().map(|r| r.seq).collect();
        assert_eq!(seqs, vec![4, 3]);
    }

    #[tokio::test]
    async fn test_concurrent_upserts_keep_minimum() {
        use std::sync::Arc;

        let store = Arc::new(MemoryStore::new());
        let mut handles = Vec::new();
        for score in [45u32, 41, 48, 39, 44, 42, 47, 40] {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .upsert_if_better("a@b.c", "python", score, consent(), "nick")
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        let hero = store.get_hero("a@b.c").await.unwrap().unwrap();
        assert_eq!(hero.score, 39);
    }
}
