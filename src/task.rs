//! Task contract for golf problems
//!
//! A task is a pure definition of one golf problem: the argument tuples the
//! submission is run against, the reference output for each tuple, and an
//! optional pre-check over the submitted source. Tasks hold no mutable state
//! and are selected once at process start from configuration.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A single golf problem.
///
/// `arguments` and `reference` must be deterministic and side-effect-free:
/// the comparator calls both fresh on every submission and relies on repeated
/// evaluation producing identical expected outputs.
pub trait Task: Send + Sync {
    /// The fixed, ordered set of argument tuples for this task.
    fn arguments(&self) -> Vec<Vec<String>>;

    /// Ground-truth stdout for one argument tuple.
    fn reference(&self, argv: &[String]) -> String;

    /// Pre-check/transform applied to submitted source before any execution.
    /// The default accepts the code unchanged.
    fn validate(&self, code: &str) -> Result<String, ValidationError> {
        Ok(code.to_string())
    }
}

/// Task selection, resolved from the engine configuration at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    #[default]
    Banner,
}

impl TaskKind {
    pub fn build(self) -> Arc<dyn Task> {
        match self {
            TaskKind::Banner => Arc::new(BannerTask),
        }
    }
}

/// The contest banner task: print a greeting line followed by an `=` rule of
/// the same length. Submitted source may not contain digits, which rules out
/// hardcoding the rule length.
pub struct BannerTask;

impl Task for BannerTask {
    fn arguments(&self) -> Vec<Vec<String>> {
        vec![
            vec!["Join our team <3".to_string()],
            vec!["The cake is a lie".to_string()],
            vec!["I like trains".to_string()],
        ]
    }

    fn reference(&self, argv: &[String]) -> String {
        let text = argv.first().map(String::as_str).unwrap_or("");
        let first_line = format!("Clearcode @ SpreadIT 2019: {}", text);
        let rule = "=".repeat(first_line.chars().count());
        format!("{}\n{}\n", first_line, rule)
    }

    fn validate(&self, code: &str) -> Result<String, ValidationError> {
        if code.chars().any(|c| c.is_ascii_digit()) {
            return Err(ValidationError::new("the code cannot contain digits"));
        }
        Ok(code.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner_reference_output() {
        let task = BannerTask;
        let out = task.reference(&["I like trains".to_string()]);
        let expected = "Clearcode @ SpreadIT 2019: I like trains\n\
                        ========================================\n";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_banner_reference_is_deterministic() {
        let task = BannerTask;
        for argv in task.arguments() {
            assert_eq!(task.reference(&argv), task.reference(&argv));
        }
        assert_eq!(task.arguments(), task.arguments());
    }

    #[test]
    fn test_banner_rejects_digits() {
        let task = BannerTask;
        let err = task.validate("print(1)").unwrap_err();
        assert_eq!(err.message, "the code cannot contain digits");
        assert!(task.validate("echo hi").is_ok());
    }

    #[test]
    fn test_validate_passes_code_through() {
        let task = BannerTask;
        assert_eq!(task.validate("echo hi").unwrap(), "echo hi");
    }

    #[test]
    fn test_task_kind_builds_banner() {
        let task = TaskKind::Banner.build();
        assert_eq!(task.arguments().len(), 3);
    }
}
