//! CSV and JSON writers for sanitized records.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use tracing::{info, warn};

use crate::domain::{ChoiceLabel, SanitizedMcq};
use crate::error::{PipelineError, Result};

/// Quiz form of a record: options keyed by label, explanation as `reason`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizItem {
  pub question: String,
  pub options: QuizOptions,
  pub answer: ChoiceLabel,
  pub reason: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizOptions {
  #[serde(rename = "A")] pub a: String,
  #[serde(rename = "B")] pub b: String,
  #[serde(rename = "C")] pub c: String,
  #[serde(rename = "D")] pub d: String,
}

pub fn to_quiz_items(records: &[SanitizedMcq]) -> Vec<QuizItem> {
  records
    .iter()
    .map(|r| QuizItem {
      question: r.question.clone(),
      options: QuizOptions {
        a: r.option_a.clone(),
        b: r.option_b.clone(),
        c: r.option_c.clone(),
        d: r.option_d.clone(),
      },
      answer: r.correct_option,
      reason: r.description.clone(),
    })
    .collect()
}

/// Header plus one row per record. Returns the number of rows written.
pub fn write_csv<W: Write>(records: &[SanitizedMcq], writer: W) -> Result<usize> {
  let mut out = csv::Writer::from_writer(writer);
  for record in records {
    out.serialize(record)?;
  }
  out.flush().map_err(|e| PipelineError::Export(e.to_string()))?;
  Ok(records.len())
}

/// Writes `path` only when there is something to write.
pub fn save_csv(records: &[SanitizedMcq], path: &Path) -> Result<usize> {
  if records.is_empty() {
    warn!(target: "mcq_extract", path = %path.display(), "No records to save; CSV not written");
    return Ok(0);
  }
  let file = File::create(path).map_err(|e| PipelineError::Export(format!("{}: {e}", path.display())))?;
  let rows = write_csv(records, file)?;
  info!(target: "mcq_extract", path = %path.display(), rows, "Saved CSV");
  Ok(rows)
}

/// Pretty JSON array with 4-space indentation; non-ASCII is written as-is.
pub fn write_json<W: Write>(items: &[QuizItem], writer: W) -> Result<()> {
  let mut ser = serde_json::Serializer::with_formatter(writer, PrettyFormatter::with_indent(b"    "));
  items.serialize(&mut ser)?;
  Ok(())
}

pub fn save_json(items: &[QuizItem], path: &Path) -> Result<()> {
  let file = File::create(path).map_err(|e| PipelineError::Export(format!("{}: {e}", path.display())))?;
  write_json(items, file)?;
  info!(target: "mcq_extract", path = %path.display(), items = items.len(), "Saved JSON");
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::ChapterId;

  fn record(question: &str) -> SanitizedMcq {
    SanitizedMcq {
      chapter_name: "units and measurements".into(),
      question: question.into(),
      option_a: "[M^1 L^-2]".into(),
      option_b: "kg / m^3".into(),
      option_c: "N * m".into(),
      option_d: "none, of these".into(),
      correct_option: ChoiceLabel::C,
      description: "Torque is r × F".into(),
      chapter_id: ChapterId::parse("b89cc0b0-2acd-4003-9c61-dbc771402574").unwrap(),
      user_id: None,
    }
  }

  #[test]
  fn csv_header_and_empty_user_id() {
    let mut buf = Vec::new();
    let rows = write_csv(&[record("Unit of torque?")], &mut buf).unwrap();
    assert_eq!(rows, 1);

    let out = String::from_utf8(buf).unwrap();
    let mut lines = out.lines();
    assert_eq!(
      lines.next(),
      Some("chapter_name,question,option_a,option_b,option_c,option_d,correct_option,description,chapter_id,user_id")
    );
    assert_eq!(
      lines.next(),
      Some("units and measurements,Unit of torque?,[M^1 L^-2],kg / m^3,N * m,\"none, of these\",C,Torque is r × F,b89cc0b0-2acd-4003-9c61-dbc771402574,")
    );
    assert_eq!(lines.next(), None);
  }

  #[test]
  fn save_csv_skips_empty_batch() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.csv");
    assert_eq!(save_csv(&[], &path).unwrap(), 0);
    assert!(!path.exists());
  }

  #[test]
  fn json_items_use_four_space_indent_and_decode_back() {
    let items = to_quiz_items(&[record("Unit of torque?")]);
    let mut buf = Vec::new();
    write_json(&items, &mut buf).unwrap();
    let out = String::from_utf8(buf).unwrap();

    assert!(out.starts_with("[\n    {\n        \"question\": \"Unit of torque?\","));
    assert!(out.contains("\"A\": \"[M^1 L^-2]\""));
    assert!(out.contains("\"answer\": \"C\""));
    assert!(out.contains("r × F"));

    let back: Vec<QuizItem> = serde_json::from_str(&out).unwrap();
    assert_eq!(back, items);
  }

  #[test]
  fn save_json_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quiz.json");
    save_json(&to_quiz_items(&[record("Unit of torque?")]), &path).unwrap();
    let back: Vec<QuizItem> = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(back[0].options.c, "N * m");
  }
}
