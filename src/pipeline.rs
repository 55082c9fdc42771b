//! Pipeline orchestration: locate → answers + solutions → MCQs → transform → sanitize.

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::answers::extract_answers;
use crate::config::{ExtractionMode, ExtractorConfig};
use crate::domain::{AnswerKey, ChapterId, RawMcq, SanitizedMcq, SolutionIndex};
use crate::error::{PipelineError, Result};
use crate::generic::scan_answered_mcqs;
use crate::mcq::McqParser;
use crate::sanitize::{transform_for_db, Rejection, Sanitizer};
use crate::sections::SectionLocator;
use crate::solutions::extract_solutions;

/// Everything recovered from one document before sanitization.
#[derive(Clone, Debug, Default)]
pub struct Extraction {
  pub mcqs: Vec<RawMcq>,
  pub answers: AnswerKey,
  pub solutions: SolutionIndex,
  /// Anchors that did not yield a complete question.
  pub skipped: Vec<u32>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
  pub extracted: usize,
  pub sanitized: usize,
  pub rejected: usize,
  /// Anchors dropped before sanitization; not part of `extracted`.
  pub skipped: usize,
}

#[derive(Clone, Debug)]
pub struct DocumentReport {
  pub chapter_name: String,
  pub extracted: usize,
  pub records: Vec<SanitizedMcq>,
  pub rejections: Vec<Rejection>,
  /// Ordinals of anchors with no complete question behind them.
  pub skipped: Vec<u32>,
}

impl DocumentReport {
  pub fn counts(&self) -> Counts {
    Counts {
      extracted: self.extracted,
      sanitized: self.records.len(),
      rejected: self.rejections.len(),
      skipped: self.skipped.len(),
    }
  }
}

/// Compiled extractor; build once, share freely.
pub struct Extractor {
  locator: SectionLocator,
  parser: McqParser,
  sanitizer: Sanitizer,
  mode: ExtractionMode,
}

impl Extractor {
  pub fn new(config: ExtractorConfig) -> Result<Self> {
    Ok(Self {
      parser: McqParser::new(&config.terminators)?,
      locator: SectionLocator::new(config.markers)?,
      sanitizer: Sanitizer::new(config.min_question_chars),
      mode: config.mode,
    })
  }

  pub fn mode(&self) -> ExtractionMode { self.mode }

  #[instrument(level = "info", skip(self, text), fields(text_len = text.len(), mode = ?self.mode))]
  pub fn extract(&self, text: &str) -> Result<Extraction> {
    match self.mode {
      ExtractionMode::Sectioned => self.extract_sectioned(text),
      ExtractionMode::InlineAnswers => Ok(answered_only(text)),
      ExtractionMode::Auto => match self.extract_sectioned(text) {
        Err(err @ PipelineError::SectionNotFound { .. }) => {
          let fallback = answered_only(text);
          if fallback.mcqs.is_empty() {
            return Err(err);
          }
          info!(target: "pipeline", extracted = fallback.mcqs.len(), "No question section; used inline-answer dialect");
          Ok(fallback)
        }
        other => other,
      },
    }
  }

  fn extract_sectioned(&self, text: &str) -> Result<Extraction> {
    let sections = self.locator.locate(text)?;
    let region = self.locator.mcq_region(sections.solutions);
    let answers = extract_answers(region);
    let solutions = extract_solutions(region);
    if sections.solutions.is_empty() {
      warn!(target: "pipeline", "No solutions section; records will have no answer or description");
    }

    let scan = self.parser.scan(sections.questions, &answers, &solutions);
    if !scan.skipped.is_empty() {
      warn!(target: "pipeline", skipped = ?scan.skipped, "Anchors without a complete option set were dropped");
    }
    info!(
      target: "pipeline",
      mcqs = scan.mcqs.len(),
      skipped = scan.skipped.len(),
      answers = answers.len(),
      solutions = solutions.len(),
      "Extraction finished"
    );
    Ok(Extraction { mcqs: scan.mcqs, answers, solutions, skipped: scan.skipped })
  }

  /// Chapter id is validated before any text is scanned.
  #[instrument(level = "info", skip(self, text), fields(text_len = text.len()))]
  pub fn process(&self, text: &str, chapter_id: &str, chapter_name: &str) -> Result<DocumentReport> {
    let chapter = ChapterId::parse(chapter_id)?;
    let extraction = self.extract(text)?;
    let extracted = extraction.mcqs.len();

    let transformed = transform_for_db(extraction.mcqs, chapter);
    let report = self.sanitizer.sanitize(&transformed, chapter_id, chapter_name)?;

    Ok(DocumentReport {
      chapter_name: chapter_name.to_string(),
      extracted,
      records: report.records,
      rejections: report.rejections,
      skipped: extraction.skipped,
    })
  }
}

fn answered_only(text: &str) -> Extraction {
  let scan = scan_answered_mcqs(text);
  if !scan.skipped.is_empty() {
    warn!(target: "pipeline", skipped = ?scan.skipped, "Anchors without options and answer tag were dropped");
  }
  let answers = scan.mcqs.iter().filter_map(|m| Some((m.ordinal, m.correct_option?))).collect();
  Extraction { mcqs: scan.mcqs, answers, skipped: scan.skipped, ..Extraction::default() }
}
