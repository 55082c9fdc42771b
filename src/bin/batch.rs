//! Batch extraction over the `[[documents]]` list of a pipeline config.
//!
//! Usage: mcq-batch [config.toml]   (falls back to EXTRACT_CONFIG_PATH)
//!
//! Each document is validated, extracted, sanitized and written to CSV (and JSON when
//! `json_out` is set). A bad document is logged and skipped; the rest still run.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use tracing::{error, info, warn};

use mcq_extract::config::{load_config, DocumentJob};
use mcq_extract::domain::ChapterId;
use mcq_extract::export::{save_csv, save_json, to_quiz_items};
use mcq_extract::pipeline::{Counts, Extractor};
use mcq_extract::source::load_document_text;
use mcq_extract::telemetry;
use mcq_extract::Result;

enum Outcome {
    Done(Counts),
    Skipped(String),
    Failed(String),
}

fn main() -> ExitCode {
    telemetry::init_tracing();

    let Some(config_path) = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("EXTRACT_CONFIG_PATH").ok())
        .map(PathBuf::from)
    else {
        eprintln!("usage: mcq-batch <config.toml>  (or set EXTRACT_CONFIG_PATH)");
        return ExitCode::from(2);
    };

    let Some(config) = load_config(&config_path) else {
        return ExitCode::FAILURE;
    };
    if config.documents.is_empty() {
        warn!(target: "mcq_extract", path = %config_path.display(), "Config lists no [[documents]]; nothing to do");
        return ExitCode::SUCCESS;
    }

    let extractor = match Extractor::new(config.extractor) {
        Ok(ex) => ex,
        Err(e) => {
            error!(target: "mcq_extract", error = %e, "Invalid extractor configuration");
            return ExitCode::FAILURE;
        }
    };

    let total = config.documents.len();
    let start_time = Instant::now();
    let mut outcomes = Vec::with_capacity(total);

    for (i, job) in config.documents.iter().enumerate() {
        info!(target: "mcq_extract", doc = i + 1, total, path = %job.path.display(), "Processing document");
        let outcome = match precheck(job) {
            Some(reason) => {
                error!(target: "mcq_extract", path = %job.path.display(), %reason, "Document skipped");
                Outcome::Skipped(reason)
            }
            None => match run_job(&extractor, job) {
                Ok(counts) => Outcome::Done(counts),
                Err(e) => {
                    error!(target: "mcq_extract", path = %job.path.display(), error = %e, "Document failed");
                    Outcome::Failed(e.to_string())
                }
            },
        };
        outcomes.push((job, outcome));
    }

    print_summary(&outcomes, start_time.elapsed().as_secs_f64());

    if outcomes.iter().any(|(_, o)| matches!(o, Outcome::Failed(_))) {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Reasons to skip a document before reading it.
fn precheck(job: &DocumentJob) -> Option<String> {
    if let Err(e) = ChapterId::parse(&job.chapter_id) {
        return Some(e.to_string());
    }
    if !job.path.exists() {
        return Some("file not found".to_string());
    }
    None
}

fn run_job(extractor: &Extractor, job: &DocumentJob) -> Result<Counts> {
    let text = load_document_text(&job.path)?;
    let report = extractor.process(&text, &job.chapter_id, &job.chapter_name())?;

    save_csv(&report.records, &job.csv_path())?;
    if let Some(json_path) = &job.json_out {
        save_json(&to_quiz_items(&report.records), json_path)?;
    }
    Ok(report.counts())
}

fn print_summary(outcomes: &[(&DocumentJob, Outcome)], elapsed_secs: f64) {
    println!("----------------------------------------------");
    println!("  MCQ batch summary ({:.1}s)", elapsed_secs);
    println!("----------------------------------------------");
    let mut emitted = 0usize;
    for (job, outcome) in outcomes {
        match outcome {
            Outcome::Done(c) => {
                emitted += c.sanitized;
                println!(
                    "  OK    {}: {} extracted, {} sanitized, {} rejected, {} skipped -> {}",
                    job.chapter_name(),
                    c.extracted,
                    c.sanitized,
                    c.rejected,
                    c.skipped,
                    job.csv_path().display()
                );
            }
            Outcome::Skipped(reason) => println!("  SKIP  {}: {}", job.path.display(), reason),
            Outcome::Failed(reason) => println!("  FAIL  {}: {}", job.path.display(), reason),
        }
    }
    println!("  {} records emitted across {} documents", emitted, outcomes.len());
}
