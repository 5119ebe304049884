//! Code golf contest engine
//!
//! Runs a timed code-golf contest: submissions are executed against a fixed
//! per-task input/output contract, judged by exact output comparison, scored
//! by source length (shorter is better), and ranked on a leaderboard whose
//! stored scores only ever improve. HTTP, HTML and identity verification are
//! left to the integrating system; this crate is the task harness, the
//! comparison/diagnostic pipeline and the scoring/audit subsystem.

pub mod audit;
pub mod comparator;
pub mod config;
pub mod diff;
pub mod error;
pub mod languages;
pub mod leaderboard;
pub mod pipeline;
pub mod runner;
pub mod scoring;
pub mod store;
pub mod task;
pub mod usernames;

pub use comparator::{Comparator, Diagnostic};
pub use config::EngineConfig;
pub use diff::{DiffLine, DiffTag};
pub use error::{EngineError, StorageError, ValidationError};
pub use languages::LanguageRegistry;
pub use leaderboard::{AuditPage, HeroQuery, HeroRow, Leaderboard, ScoreCell};
pub use pipeline::{Submission, SubmissionOutcome, SubmissionPipeline};
pub use runner::{ProcessRunner, RunOutcome, Runner, RunnerError};
pub use scoring::{ScoreDecision, ScoringEngine};
pub use store::{Consent, Hero, MemoryStore, Store};
pub use task::{BannerTask, Task, TaskKind};
