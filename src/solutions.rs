//! Solution-text extraction: `<ordinal>. <prose>` spans inside the solution block.
//!
//! Answer-key index lines are removed first so they do not open empty spans or leak
//! letters into explanations.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, instrument};

use crate::domain::SolutionIndex;
use crate::normalize::normalize_multiline;

/// A line made only of answer tokens: `1. (a) 2. (c)`.
static ANSWER_ONLY_LINE: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"^\s*(?:\d+\.\s*\(\s*[a-dA-D]\s*\)[\s,;]*)+$").unwrap());

/// An answer token opening a line of prose: `1. (b) Since W = Fd ...`.
static LEADING_ANSWER: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"^(\s*\d+\.)\s*\(\s*[a-dA-D]\s*\)\s*").unwrap());

static SPAN_ANCHOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*(\d+)\.[ \t]+").unwrap());

#[instrument(level = "debug", skip(block), fields(block_len = block.len()))]
pub fn extract_solutions(block: &str) -> SolutionIndex {
  let prose = strip_answer_lines(block);

  let anchors: Vec<(u32, usize, usize)> = SPAN_ANCHOR
    .captures_iter(&prose)
    .filter_map(|cap| {
      let whole = cap.get(0)?;
      let ordinal = cap[1].parse::<u32>().ok()?;
      Some((ordinal, whole.start(), whole.end()))
    })
    .collect();

  let mut solutions = SolutionIndex::new();
  for (i, (ordinal, _, body_start)) in anchors.iter().enumerate() {
    let body_end = anchors.get(i + 1).map(|(_, start, _)| *start).unwrap_or(prose.len());
    let text = normalize_multiline(&prose[*body_start..body_end]);
    if text.is_empty() {
      continue;
    }
    if solutions.insert(*ordinal, text).is_some() {
      debug!(target: "pipeline", ordinal, "Solution ordinal repeated; keeping the later text");
    }
  }
  solutions
}

fn strip_answer_lines(block: &str) -> String {
  block
    .lines()
    .filter(|line| !ANSWER_ONLY_LINE.is_match(line))
    .map(|line| LEADING_ANSWER.replace(line, "${1} ").into_owned())
    .collect::<Vec<_>>()
    .join("\n")
}
