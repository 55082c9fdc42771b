//! Domain models flowing through the pipeline: one record type per stage, plus the
//! answer/solution indices and the validated chapter identifier.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{PipelineError, Result};

/// Ordinal → lowercase answer letter (`a`..=`d`).
pub type AnswerKey = BTreeMap<u32, char>;

/// Ordinal → explanation text (never empty).
pub type SolutionIndex = BTreeMap<u32, String>;

/// Canonical choice label of a sanitized record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChoiceLabel { A, B, C, D }

impl ChoiceLabel {
  pub const ALL: [ChoiceLabel; 4] = [ChoiceLabel::A, ChoiceLabel::B, ChoiceLabel::C, ChoiceLabel::D];

  /// Case-insensitive mapping from a raw answer letter.
  pub fn from_letter(c: char) -> Option<Self> {
    match c.to_ascii_lowercase() {
      'a' => Some(ChoiceLabel::A),
      'b' => Some(ChoiceLabel::B),
      'c' => Some(ChoiceLabel::C),
      'd' => Some(ChoiceLabel::D),
      _ => None,
    }
  }

  /// Accepts exactly one letter after trimming, e.g. `"b"` or `" C "`.
  pub fn parse(s: &str) -> Option<Self> {
    let mut chars = s.trim().chars();
    match (chars.next(), chars.next()) {
      (Some(c), None) => Self::from_letter(c),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      ChoiceLabel::A => "A",
      ChoiceLabel::B => "B",
      ChoiceLabel::C => "C",
      ChoiceLabel::D => "D",
    }
  }
}

impl fmt::Display for ChoiceLabel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// How the options of a question were laid out in the source text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
  /// `(a) .. (b) .. (c) .. (d) ..` on a running line.
  Inline,
  /// Each `(x)` introducer at the start of its own line.
  Newline,
  /// Options followed by an `Ans: (x)` tag inside the question itself.
  AnsweredInline,
}

/// A validated chapter identifier. Construction is the only validation point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChapterId(Uuid);

impl ChapterId {
  pub fn parse(raw: &str) -> Result<Self> {
    Uuid::parse_str(raw.trim())
      .map(ChapterId)
      .map_err(|_| PipelineError::InvalidChapterId(raw.to_string()))
  }

  pub fn uuid(&self) -> Uuid { self.0 }
}

impl fmt::Display for ChapterId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

/// One question as carved out of the source text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RawMcq {
  pub ordinal: u32,
  pub question: String,
  pub option_a: String,
  pub option_b: String,
  pub option_c: String,
  pub option_d: String,
  /// Lowercase letter from the answer key, when one was found for this ordinal.
  pub correct_option: Option<char>,
  pub description: Option<String>,
  pub layout: Layout,
}

/// Raw record shaped for the database: chapter attached, answer letter uppercased.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TransformedMcq {
  pub ordinal: u32,
  pub question: String,
  pub option_a: String,
  pub option_b: String,
  pub option_c: String,
  pub option_d: String,
  /// `"A"`..`"D"`, or empty when the raw record had no usable answer.
  pub correct_option: String,
  pub description: String,
  pub chapter_id: ChapterId,
  pub user_id: Option<Uuid>,
}

/// Terminal, exported record. Field order is the CSV column order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanitizedMcq {
  pub chapter_name: String,
  pub question: String,
  pub option_a: String,
  pub option_b: String,
  pub option_c: String,
  pub option_d: String,
  pub correct_option: ChoiceLabel,
  pub description: String,
  pub chapter_id: ChapterId,
  pub user_id: Option<Uuid>,
}

impl SanitizedMcq {
  /// Dedup key: question plus the four options, exactly as emitted.
  pub fn fingerprint(&self) -> (&str, &str, &str, &str, &str) {
    (&self.question, &self.option_a, &self.option_b, &self.option_c, &self.option_d)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn choice_label_parsing_is_case_insensitive() {
    assert_eq!(ChoiceLabel::parse("b"), Some(ChoiceLabel::B));
    assert_eq!(ChoiceLabel::parse(" D "), Some(ChoiceLabel::D));
    assert_eq!(ChoiceLabel::parse("e"), None);
    assert_eq!(ChoiceLabel::parse("ab"), None);
    assert_eq!(ChoiceLabel::parse(""), None);
  }

  #[test]
  fn chapter_id_rejects_garbage() {
    assert!(ChapterId::parse("b89cc0b0-2acd-4003-9c61-dbc771402574").is_ok());
    let err = ChapterId::parse("not-a-uuid").unwrap_err();
    assert!(matches!(err, PipelineError::InvalidChapterId(ref s) if s == "not-a-uuid"));
  }

  #[test]
  fn chapter_id_serializes_as_hyphenated_string() {
    let id = ChapterId::parse("b89cc0b0-2acd-4003-9c61-dbc771402574").unwrap();
    assert_eq!(serde_json::to_string(&id).unwrap(), "\"b89cc0b0-2acd-4003-9c61-dbc771402574\"");
  }
}
