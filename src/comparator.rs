//! Comparator - runs a submission against the task and diagnoses failures
//!
//! For one submission the comparator validates the source, then walks the
//! task's argument tuples in order, running the reference function and the
//! runner on each. The first mismatch or runner failure short-circuits into a
//! diagnostic with a unified diff; a full pass accepts the submission.
//! Comparison is exact string equality, no normalization of any kind.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;

use crate::diff::{self, DiffLine};
use crate::runner::Runner;
use crate::task::Task;

/// Player-facing explanation of a rejected submission. Not an error type;
/// every variant carries enough structure for a presentation layer to render
/// the complete diagnostic without re-deriving anything.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Rejected by the task's pre-check; nothing was executed.
    Validation { message: String },
    /// Ran fine but printed the wrong thing for this argument tuple.
    Mismatch {
        argv: Vec<String>,
        diff: Vec<DiffLine>,
        error_output: String,
    },
    /// The runner itself failed (crash, timeout, unknown language, ...).
    Runner {
        argv: Vec<String>,
        /// Stable failure tag from the runner, for observability
        tag: String,
        reason: String,
        diff: Vec<DiffLine>,
        error_output: String,
    },
}

impl Diagnostic {
    /// Rendered diff lines, empty for validation failures.
    pub fn diff(&self) -> &[DiffLine] {
        match self {
            Diagnostic::Validation { .. } => &[],
            Diagnostic::Mismatch { diff, .. } | Diagnostic::Runner { diff, .. } => diff,
        }
    }

    /// Captured error stream, empty for validation failures.
    pub fn error_output(&self) -> &str {
        match self {
            Diagnostic::Validation { .. } => "",
            Diagnostic::Mismatch { error_output, .. }
            | Diagnostic::Runner { error_output, .. } => error_output,
        }
    }
}

/// Evaluates one submission against the configured task.
///
/// Holds no mutable state; the semaphore is admission control bounding how
/// many runner invocations may be in flight across concurrent submissions.
pub struct Comparator {
    task: Arc<dyn Task>,
    runner: Arc<dyn Runner>,
    run_permits: Arc<Semaphore>,
}

impl Comparator {
    pub fn new(task: Arc<dyn Task>, runner: Arc<dyn Runner>, max_concurrent_runs: usize) -> Self {
        Self {
            task,
            runner,
            run_permits: Arc::new(Semaphore::new(max_concurrent_runs.max(1))),
        }
    }

    /// Run the submission against every argument tuple. `Ok(())` means every
    /// tuple produced exactly the reference output.
    pub async fn evaluate(&self, language: &str, code: &str) -> Result<(), Diagnostic> {
        let code = self
            .task
            .validate(code)
            .map_err(|err| Diagnostic::Validation {
                message: err.message,
            })?;

        for argv in self.task.arguments() {
            let expected = self.task.reference(&argv);

            let _permit = self
                .run_permits
                .acquire()
                .await
                .expect("run permit semaphore closed");

            match self.runner.execute(language, &code, &argv).await {
                Ok(outcome) if outcome.stdout == expected => continue,
                Ok(outcome) => {
                    return Err(Diagnostic::Mismatch {
                        diff: diff_against(&outcome.stdout, &expected, &argv),
                        error_output: outcome.stderr,
                        argv,
                    });
                }
                Err(err) => {
                    return Err(Diagnostic::Runner {
                        diff: diff_against(err.partial_stdout(), &expected, &argv),
                        tag: err.tag().to_string(),
                        error_output: err.error_output().to_string(),
                        reason: err.to_string(),
                        argv,
                    });
                }
            }
        }

        Ok(())
    }
}

fn diff_against(actual: &str, expected: &str, argv: &[String]) -> Vec<DiffLine> {
    diff::unified(actual, expected, "your output", &format!("args: {:?}", argv))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::diff::DiffTag;
    use crate::error::ValidationError;
    use crate::runner::{RunOutcome, RunnerError};

    /// Task with several tuples: echo the argument followed by a newline.
    struct EchoTask;

    impl Task for EchoTask {
        fn arguments(&self) -> Vec<Vec<String>> {
            vec![
                vec!["one".to_string()],
                vec!["two".to_string()],
                vec!["three".to_string()],
            ]
        }

        fn reference(&self, argv: &[String]) -> String {
            format!("{}\n", argv.join(" "))
        }

        fn validate(&self, code: &str) -> Result<String, ValidationError> {
            if code.contains('!') {
                return Err(ValidationError::new("no shouting"));
            }
            Ok(code.to_string())
        }
    }

    /// Runner scripted through markers in the submitted code:
    /// - "chop": drop the trailing newline of the reference output
    /// - "boom": fail with a nonzero exit on the second tuple
    /// - anything else: produce the reference output
    struct ScriptedRunner {
        calls: AtomicUsize,
    }

    impl ScriptedRunner {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Runner for ScriptedRunner {
        async fn execute(
            &self,
            _language: &str,
            code: &str,
            argv: &[String],
        ) -> Result<RunOutcome, RunnerError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            let reference = format!("{}\n", argv.join(" "));
            if code.contains("boom") && call == 1 {
                return Err(RunnerError::Exit {
                    code: 1,
                    stdout: String::new(),
                    stderr: "boom\n".to_string(),
                });
            }
            let stdout = if code.contains("chop") {
                reference.trim_end().to_string()
            } else {
                reference
            };
            Ok(RunOutcome {
                stdout,
                stderr: String::new(),
                duration: std::time::Duration::from_millis(1),
            })
        }
    }

    fn comparator(runner: Arc<ScriptedRunner>) -> Comparator {
        Comparator::new(Arc::new(EchoTask), runner, 2)
    }

    #[tokio::test]
    async fn test_all_tuples_matching_accepts() {
        let runner = Arc::new(ScriptedRunner::new());
        let cmp = comparator(runner.clone());
        assert!(cmp.evaluate("python", "print").await.is_ok());
        assert_eq!(runner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_validation_failure_skips_execution() {
        let runner = Arc::new(ScriptedRunner::new());
        let cmp = comparator(runner.clone());
        let diag = cmp.evaluate("python", "print!").await.unwrap_err();
        match diag {
            Diagnostic::Validation { ref message } => assert_eq!(message, "no shouting"),
            other => panic!("expected validation diagnostic, got {:?}", other),
        }
        assert!(diag.diff().is_empty());
        assert_eq!(runner.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_first_mismatch_short_circuits() {
        let runner = Arc::new(ScriptedRunner::new());
        let cmp = comparator(runner.clone());
        let diag = cmp.evaluate("python", "chop").await.unwrap_err();
        match diag {
            Diagnostic::Mismatch { ref argv, ref diff, .. } => {
                assert_eq!(argv, &["one".to_string()]);
                assert!(diff.iter().any(|l| l.tag == DiffTag::Removed && l.text == "one"));
                assert!(diff.iter().any(|l| l.tag == DiffTag::Added && l.text == "one\n"));
            }
            other => panic!("expected mismatch diagnostic, got {:?}", other),
        }
        // Only the first tuple was attempted.
        assert_eq!(runner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_runner_failure_becomes_diagnostic() {
        let runner = Arc::new(ScriptedRunner::new());
        let cmp = comparator(runner.clone());
        let diag = cmp.evaluate("python", "boom").await.unwrap_err();
        match diag {
            Diagnostic::Runner {
                ref argv,
                ref tag,
                ref error_output,
                ..
            } => {
                assert_eq!(argv, &["two".to_string()]);
                assert_eq!(tag, "exit");
                assert_eq!(error_output, "boom\n");
            }
            other => panic!("expected runner diagnostic, got {:?}", other),
        }
        assert_eq!(runner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_diagnostic_serializes_for_presentation() {
        let runner = Arc::new(ScriptedRunner::new());
        let cmp = comparator(runner);
        let diag = cmp.evaluate("python", "chop").await.unwrap_err();
        let json = serde_json::to_string(&diag).unwrap();
        assert!(json.contains("\"kind\":\"mismatch\""));
        let parsed: Diagnostic = serde_json::from_str(&json).unwrap();
        assert!(!parsed.diff().is_empty());
    }
}
