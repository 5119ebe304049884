//! Runner boundary - execution of submitted code
//!
//! The harness depends only on the `Runner` trait: run this code in this
//! language with this argv, give back stdout or a structured failure. The
//! shipped `ProcessRunner` spawns the language's interpreter as a plain
//! subprocess with a per-call timeout; integrators needing real isolation
//! supply their own implementation of the trait.
//!
//! Runner failures are opaque to the harness. The variant tells observability
//! *what* kind of failure occurred, never *why* the submission is wrong.

use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::languages::LanguageRegistry;

/// Captured result of one successful run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub stdout: String,
    pub stderr: String,
    /// Wall-clock duration of this invocation
    pub duration: Duration,
}

/// Structured failure from one runner invocation. Always carries whatever
/// partial stdout/stderr was captured before the failure.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("unsupported language: {0}")]
    UnknownLanguage(String),
    #[error("failed to start submission process: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("submission exceeded the {}ms time limit", limit.as_millis())]
    Timeout {
        limit: Duration,
        stdout: String,
        stderr: String,
    },
    #[error("submission exited with status {code}")]
    Exit {
        code: i32,
        stdout: String,
        stderr: String,
    },
}

impl RunnerError {
    /// Partial stdout captured before the failure, if any.
    pub fn partial_stdout(&self) -> &str {
        match self {
            RunnerError::Timeout { stdout, .. } | RunnerError::Exit { stdout, .. } => stdout,
            _ => "",
        }
    }

    /// Captured error stream, falling back to nothing for pre-spawn failures.
    pub fn error_output(&self) -> &str {
        match self {
            RunnerError::Timeout { stderr, .. } | RunnerError::Exit { stderr, .. } => stderr,
            _ => "",
        }
    }

    /// Short stable tag for logs and audit review.
    pub fn tag(&self) -> &'static str {
        match self {
            RunnerError::UnknownLanguage(_) => "unknown_language",
            RunnerError::Spawn(_) => "spawn",
            RunnerError::Timeout { .. } => "timeout",
            RunnerError::Exit { .. } => "exit",
        }
    }
}

/// Execution boundary for untrusted submissions.
#[async_trait]
pub trait Runner: Send + Sync {
    /// Run `code` in `language` with the given argument tuple and capture
    /// stdout. One invocation per argument tuple; the per-call timeout is the
    /// runner's responsibility.
    async fn execute(
        &self,
        language: &str,
        code: &str,
        argv: &[String],
    ) -> Result<RunOutcome, RunnerError>;
}

/// Runner that executes submissions as plain subprocesses.
pub struct ProcessRunner {
    registry: LanguageRegistry,
    time_limit: Duration,
}

impl ProcessRunner {
    pub fn new(registry: LanguageRegistry, time_limit: Duration) -> Self {
        Self {
            registry,
            time_limit,
        }
    }
}

#[async_trait]
impl Runner for ProcessRunner {
    async fn execute(
        &self,
        language: &str,
        code: &str,
        argv: &[String],
    ) -> Result<RunOutcome, RunnerError> {
        let lang_config = self
            .registry
            .get(language)
            .ok_or_else(|| RunnerError::UnknownLanguage(language.to_string()))?;

        let temp_dir = tempfile::tempdir().map_err(RunnerError::Spawn)?;
        let source_path = temp_dir.path().join(&lang_config.source_file);
        std::fs::write(&source_path, code).map_err(RunnerError::Spawn)?;

        let (program, base_args) = lang_config
            .run_command
            .split_first()
            .ok_or_else(|| RunnerError::UnknownLanguage(language.to_string()))?;

        debug!(
            "Running submission: {} {:?} argv={:?}",
            program, base_args, argv
        );

        let started = Instant::now();
        let mut child = Command::new(program)
            .args(base_args)
            .args(argv)
            .current_dir(temp_dir.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(RunnerError::Spawn)?;

        // Drain pipes concurrently so a chatty submission cannot deadlock on
        // a full pipe buffer while we wait for it to exit.
        let stdout_task = drain(child.stdout.take());
        let stderr_task = drain(child.stderr.take());

        let status = match tokio::time::timeout(self.time_limit, child.wait()).await {
            Ok(waited) => waited.map_err(RunnerError::Spawn)?,
            Err(_) => {
                let _ = child.start_kill();
                let _ = child.wait().await;
                return Err(RunnerError::Timeout {
                    limit: self.time_limit,
                    stdout: collect(stdout_task).await,
                    stderr: collect(stderr_task).await,
                });
            }
        };

        let stdout = collect(stdout_task).await;
        let stderr = collect(stderr_task).await;

        if !status.success() {
            return Err(RunnerError::Exit {
                code: status.code().unwrap_or(-1),
                stdout,
                stderr,
            });
        }

        Ok(RunOutcome {
            stdout,
            stderr,
            duration: started.elapsed(),
        })
    }
}

fn drain(pipe: Option<impl AsyncReadExt + Unpin + Send + 'static>) -> JoinHandle<Vec<u8>> {
    tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf).await;
        }
        buf
    })
}

async fn collect(handle: JoinHandle<Vec<u8>>) -> String {
    match handle.await {
        Ok(bytes) => String::from_utf8_lossy(&bytes).to_string(),
        Err(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::languages::LanguageRegistry;

    fn echo_registry() -> LanguageRegistry {
        LanguageRegistry::from_toml_str(
            r#"
[shell]
source_file = "main.sh"
run_command = "sh main.sh"

[sleepy]
source_file = "main.sh"
run_command = "sleep"
"#,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_process_runner_captures_stdout() {
        let runner = ProcessRunner::new(echo_registry(), Duration::from_secs(5));
        let out = runner
            .execute("shell", "echo \"$1\"", &["hi there".to_string()])
            .await
            .unwrap();
        assert_eq!(out.stdout, "hi there\n");
        assert!(out.stderr.is_empty());
    }

    #[tokio::test]
    async fn test_process_runner_nonzero_exit() {
        let runner = ProcessRunner::new(echo_registry(), Duration::from_secs(5));
        let err = runner
            .execute("shell", "echo partial; echo oops >&2; exit 3", &[])
            .await
            .unwrap_err();
        match err {
            RunnerError::Exit {
                code,
                ref stdout,
                ref stderr,
            } => {
                assert_eq!(code, 3);
                assert_eq!(stdout, "partial\n");
                assert_eq!(stderr, "oops\n");
            }
            other => panic!("expected exit failure, got {:?}", other),
        }
        assert_eq!(err.tag(), "exit");
        assert_eq!(err.partial_stdout(), "partial\n");
    }

    #[tokio::test]
    async fn test_process_runner_timeout() {
        let runner = ProcessRunner::new(echo_registry(), Duration::from_millis(200));
        let err = runner
            .execute("sleepy", "", &["5".to_string()])
            .await
            .unwrap_err();
        assert_eq!(err.tag(), "timeout");
    }

    #[tokio::test]
    async fn test_unknown_language() {
        let runner = ProcessRunner::new(echo_registry(), Duration::from_secs(1));
        let err = runner.execute("cobol", "code", &[]).await.unwrap_err();
        assert_eq!(err.tag(), "unknown_language");
    }
}
