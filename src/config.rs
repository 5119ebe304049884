//! Engine configuration
//!
//! Loaded from a TOML file at process start, with the path overridable via
//! `ENGINE_CONFIG`. A missing file falls back to defaults so the binary can
//! run out of the box.

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::task::TaskKind;

/// Configuration threaded into the engine at construction time.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Which task this contest instance runs
    pub task: TaskKind,
    /// Admission-control limit on concurrent runner invocations
    pub max_concurrent_runs: usize,
    /// Per-invocation time limit for the process runner, in milliseconds
    pub run_time_limit_ms: u64,
    /// Display limit of the public leaderboard
    pub max_scores_on_main_page: usize,
    /// How many top scores the public leaderboard masks
    pub top_hide_scores: usize,
    /// Page size of the audit dashboard
    pub dashboard_page_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            task: TaskKind::Banner,
            max_concurrent_runs: 4,
            run_time_limit_ms: 10_000,
            max_scores_on_main_page: 15,
            top_hide_scores: 3,
            dashboard_page_size: 40,
        }
    }
}

impl EngineConfig {
    /// Read the configuration from a TOML file.
    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read engine config {}", path.display()))?;
        toml::from_str(&content).context("Failed to parse engine config")
    }

    /// Load from `ENGINE_CONFIG` (default `./files/engine.toml`); a missing
    /// file yields the defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("ENGINE_CONFIG").unwrap_or_else(|_| "./files/engine.toml".into());
        if !Path::new(&path).exists() {
            return Ok(Self::default());
        }
        Self::from_path(&path)
    }
}
