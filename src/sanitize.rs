//! Record shaping and sanitization: raw records → database-ready, validated, deduplicated
//! records for one chapter.
//!
//! The dedup set lives inside a single `sanitize` call; nothing is shared between calls.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::domain::{ChapterId, ChoiceLabel, RawMcq, SanitizedMcq, TransformedMcq};
use crate::error::{RejectReason, Result};
use crate::expression::format_expression;
use crate::normalize::normalize;

pub const DEFAULT_MIN_QUESTION_CHARS: usize = 5;

/// Attach the chapter and uppercase the answer letter (empty when absent or unmappable).
pub fn transform_for_db(mcqs: Vec<RawMcq>, chapter_id: ChapterId) -> Vec<TransformedMcq> {
  mcqs
    .into_iter()
    .map(|m| TransformedMcq {
      ordinal: m.ordinal,
      question: m.question,
      option_a: m.option_a,
      option_b: m.option_b,
      option_c: m.option_c,
      option_d: m.option_d,
      correct_option: m
        .correct_option
        .and_then(ChoiceLabel::from_letter)
        .map(|l| l.as_str().to_string())
        .unwrap_or_default(),
      description: m.description.unwrap_or_default(),
      chapter_id,
      user_id: None,
    })
    .collect()
}

/// A record that did not make it into the batch, and why.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Rejection {
  pub ordinal: u32,
  pub code: &'static str,
  pub reason: String,
}

impl Rejection {
  fn new(ordinal: u32, reason: &RejectReason) -> Self {
    Self { ordinal, code: reason.code(), reason: reason.to_string() }
  }
}

#[derive(Clone, Debug, Default)]
pub struct SanitizeReport {
  pub records: Vec<SanitizedMcq>,
  pub rejections: Vec<Rejection>,
}

/// Validates the chapter id up front, then cleans every record independently.
pub fn sanitize(mcqs: &[TransformedMcq], chapter_id: &str, chapter_name: &str) -> Result<SanitizeReport> {
  Sanitizer::new(DEFAULT_MIN_QUESTION_CHARS).sanitize(mcqs, chapter_id, chapter_name)
}

#[derive(Clone, Copy, Debug)]
pub struct Sanitizer {
  min_question_chars: usize,
}

impl Sanitizer {
  pub fn new(min_question_chars: usize) -> Self { Self { min_question_chars } }

  #[instrument(level = "info", skip_all, fields(input = mcqs.len(), chapter_id = %chapter_id, chapter_name = %chapter_name))]
  pub fn sanitize(&self, mcqs: &[TransformedMcq], chapter_id: &str, chapter_name: &str) -> Result<SanitizeReport> {
    let chapter = ChapterId::parse(chapter_id)?;

    let mut report = SanitizeReport::default();
    // fingerprint → ordinal of the record that claimed it
    let mut seen: HashMap<[String; 5], u32> = HashMap::new();

    for mcq in mcqs {
      match self.clean(mcq, &mut seen) {
        Ok((fingerprint, label)) => {
          let [question, option_a, option_b, option_c, option_d] = fingerprint;
          report.records.push(SanitizedMcq {
            chapter_name: chapter_name.to_string(),
            question,
            option_a,
            option_b,
            option_c,
            option_d,
            correct_option: label,
            description: clean_text(&mcq.description),
            chapter_id: chapter,
            user_id: None,
          });
        }
        Err(reason) => {
          warn!(target: "sanitize", ordinal = mcq.ordinal, code = reason.code(), %reason, "Record rejected");
          report.rejections.push(Rejection::new(mcq.ordinal, &reason));
        }
      }
    }

    info!(
      target: "sanitize",
      sanitized = report.records.len(),
      rejected = report.rejections.len(),
      raw = mcqs.len(),
      "Sanitized batch"
    );
    Ok(report)
  }

  fn clean(
    &self,
    mcq: &TransformedMcq,
    seen: &mut HashMap<[String; 5], u32>,
  ) -> std::result::Result<([String; 5], ChoiceLabel), RejectReason> {
    let fingerprint = [
      clean_text(&mcq.question),
      clean_text(&mcq.option_a),
      clean_text(&mcq.option_b),
      clean_text(&mcq.option_c),
      clean_text(&mcq.option_d),
    ];

    let answer = mcq.correct_option.trim().to_uppercase();
    let label = ChoiceLabel::parse(&answer).ok_or_else(|| RejectReason::InvalidAnswer(answer.clone()))?;

    let len = fingerprint[0].chars().count();
    if len < self.min_question_chars {
      return Err(RejectReason::QuestionTooShort { len, min: self.min_question_chars });
    }

    if let Some(first_ordinal) = seen.get(&fingerprint) {
      return Err(RejectReason::Duplicate { first_ordinal: *first_ordinal });
    }
    seen.insert(fingerprint.clone(), mcq.ordinal);

    Ok((fingerprint, label))
  }
}

/// The cleaning applied to every text field: normalize, format, normalize again so
/// operator padding never leaves double spaces.
pub fn clean_text(text: &str) -> String {
  normalize(&format_expression(&normalize(text)))
}
