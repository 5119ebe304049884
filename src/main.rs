//! One-shot judging from the command line
//!
//! Reads a submission from a file and runs it through the full pipeline
//! against the configured task, printing the diff on failure. Useful for
//! task authors checking their contract before a contest.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use golf_engine::{
    Consent, Diagnostic, EngineConfig, HeroQuery, LanguageRegistry, MemoryStore, ProcessRunner,
    Submission, SubmissionOutcome, SubmissionPipeline,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("golf_engine=info".parse()?),
        )
        .init();

    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 4 {
        eprintln!("usage: {} EMAIL LANGUAGE SOURCE_FILE", args[0]);
        std::process::exit(2);
    }
    let email = args[1].clone();
    let language = args[2].clone();
    let code = std::fs::read_to_string(&args[3])
        .with_context(|| format!("Failed to read submission {}", args[3]))?;

    let config = EngineConfig::load()?;

    let languages_path =
        std::env::var("LANGUAGES_CONFIG").unwrap_or_else(|_| "./files/languages.toml".into());
    let registry = LanguageRegistry::from_path(&languages_path)?;
    info!("Loaded language configurations from {}", languages_path);

    let runner = Arc::new(ProcessRunner::new(
        registry,
        Duration::from_millis(config.run_time_limit_ms),
    ));
    let store = Arc::new(MemoryStore::new());
    let pipeline = SubmissionPipeline::new(config.task.build(), runner, store, &config);

    let outcome = pipeline
        .submit(Submission {
            email,
            language,
            code,
            consent: Consent {
                contest: true,
                marketing: false,
            },
        })
        .await?;

    match outcome {
        SubmissionOutcome::Accepted { display_name } => {
            println!("accepted: {}", display_name);
            let rows = pipeline
                .leaderboard()
                .heroes(&HeroQuery {
                    limit: Some(config.max_scores_on_main_page),
                    hide_top: 0,
                    pad: false,
                })
                .await?;
            for row in rows {
                println!("{:<24} {:<12} {}", row.nick, row.lang, row.score);
            }
        }
        SubmissionOutcome::Rejected(diagnostic) => {
            match &diagnostic {
                Diagnostic::Validation { message } => eprintln!("rejected: {}", message),
                Diagnostic::Runner { reason, .. } => eprintln!("rejected: {}", reason),
                Diagnostic::Mismatch { argv, .. } => {
                    eprintln!("rejected: wrong output for args {:?}", argv)
                }
            }
            for line in diagnostic.diff() {
                eprint!("{}", line);
            }
            let error_output = diagnostic.error_output();
            if !error_output.is_empty() {
                eprintln!("--- error output ---");
                eprint!("{}", error_output);
            }
            std::process::exit(1);
        }
    }

    Ok(())
}
