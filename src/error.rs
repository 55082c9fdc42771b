//! Error taxonomy for the extraction pipeline.
//!
//! - `PipelineError` aborts a document (or a whole sanitization call).
//! - `RejectReason` is the per-record accounting signal; it never aborts anything.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
  /// None of the question-section markers occur in the document.
  #[error("question section not found (looked for: {})", markers.join(", "))]
  SectionNotFound { markers: Vec<String> },

  #[error("invalid chapter_id UUID: {0:?}")]
  InvalidChapterId(String),

  #[error("invalid extractor configuration: {0}")]
  Config(String),

  #[error("failed to load document {path}: {message}")]
  Source { path: PathBuf, message: String },

  #[error("export failed: {0}")]
  Export(String),
}

impl PipelineError {
  /// True when the error only concerns the current document and a batch may continue.
  pub fn is_document_scoped(&self) -> bool {
    matches!(self, PipelineError::SectionNotFound { .. } | PipelineError::Source { .. })
  }
}

impl From<csv::Error> for PipelineError {
  fn from(e: csv::Error) -> Self { PipelineError::Export(e.to_string()) }
}

impl From<serde_json::Error> for PipelineError {
  fn from(e: serde_json::Error) -> Self { PipelineError::Export(e.to_string()) }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Why a single record was filtered out during sanitization.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RejectReason {
  #[error("correct_option {0:?} is not one of A, B, C, D")]
  InvalidAnswer(String),

  #[error("question has {len} characters, minimum is {min}")]
  QuestionTooShort { len: usize, min: usize },

  #[error("duplicate of an earlier record (ordinal {first_ordinal})")]
  Duplicate { first_ordinal: u32 },
}

impl RejectReason {
  /// Stable short code, used as a log field and in API responses.
  pub fn code(&self) -> &'static str {
    match self {
      RejectReason::InvalidAnswer(_) => "invalid_answer",
      RejectReason::QuestionTooShort { .. } => "question_too_short",
      RejectReason::Duplicate { .. } => "duplicate",
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn section_not_found_lists_markers() {
    let e = PipelineError::SectionNotFound {
      markers: vec!["Multiple Choice Questions".into(), "MCQs".into()],
    };
    assert_eq!(
      e.to_string(),
      "question section not found (looked for: Multiple Choice Questions, MCQs)"
    );
    assert!(e.is_document_scoped());
    assert!(!PipelineError::InvalidChapterId("x".into()).is_document_scoped());
  }

  #[test]
  fn reject_reason_codes_are_stable() {
    assert_eq!(RejectReason::InvalidAnswer("E".into()).code(), "invalid_answer");
    assert_eq!(RejectReason::QuestionTooShort { len: 3, min: 5 }.code(), "question_too_short");
    assert_eq!(RejectReason::Duplicate { first_ordinal: 2 }.code(), "duplicate");
  }
}
