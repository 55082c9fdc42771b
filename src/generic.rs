//! Inline-answer dialect: documents with no section markers where each question
//! carries its own answer tag.
//!
//! ```text
//! Question 12. stem  A. ..  B. ..  C. ..  D. ..  Ans: (c)
//! ```
//!
//! Question anchors are line-start only and the text is cut into chunks at anchors
//! before any option matching, so a question lacking its answer tag is dropped on its
//! own instead of merging into the next one.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::{debug, info, instrument};

use crate::domain::{Layout, RawMcq};
use crate::mcq::McqScan;
use crate::normalize::collapse_whitespace;

static QUESTION_ANCHOR: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"(?m)^[ \t]*(?:Question[ \t]+(\d{1,3})[ \t]*[.:]?|(\d{1,3})[ \t]*[.:])[ \t]+").unwrap()
});

static ANSWERED_BODY: Lazy<Regex> = Lazy::new(|| {
  Regex::new(concat!(
    r"(?s)^(?P<question>.*?)",
    r"\s(?:\(\s*[aA]\s*\)|[aA][.)])\s*(?P<a>.*?)",
    r"\s(?:\(\s*[bB]\s*\)|[bB][.)])\s*(?P<b>.*?)",
    r"\s(?:\(\s*[cC]\s*\)|[cC][.)])\s*(?P<c>.*?)",
    r"\s(?:\(\s*[dD]\s*\)|[dD][.)])\s*(?P<d>.*?)",
    r"\s*\bAns(?:wer)?\s*[:.\-]?\s*(?:\(\s*(?P<paren>[a-dA-D])\s*\)|(?P<bare>[a-dA-D])\b)",
  ))
  .unwrap()
});

pub fn extract_answered_mcqs(text: &str) -> Vec<RawMcq> {
  scan_answered_mcqs(text).mcqs
}

/// Like `extract_answered_mcqs`, also listing the anchors that were dropped.
#[instrument(level = "debug", skip(text), fields(text_len = text.len()))]
pub fn scan_answered_mcqs(text: &str) -> McqScan {
  let anchors: Vec<(u32, usize, usize)> = QUESTION_ANCHOR
    .captures_iter(text)
    .filter_map(|cap| {
      let whole = cap.get(0)?;
      let number = cap.get(1).or_else(|| cap.get(2))?;
      Some((number.as_str().parse::<u32>().ok()?, whole.start(), whole.end()))
    })
    .collect();

  let mut scan = McqScan::default();
  for (i, (ordinal, _, body_start)) in anchors.iter().enumerate() {
    let body_end = anchors.get(i + 1).map(|(_, start, _)| *start).unwrap_or(text.len());
    let chunk = &text[*body_start..body_end];
    match ANSWERED_BODY.captures(chunk).and_then(|cap| answered(*ordinal, &cap)) {
      Some(mcq) => scan.mcqs.push(mcq),
      None => {
        debug!(target: "pipeline", ordinal, "No options with answer tag after anchor; skipped");
        scan.skipped.push(*ordinal);
      }
    }
  }

  info!(target: "pipeline", anchors = anchors.len(), extracted = scan.mcqs.len(), "Inline-answer scan finished");
  scan
}

fn answered(ordinal: u32, cap: &Captures) -> Option<RawMcq> {
  let letter = cap.name("paren").or_else(|| cap.name("bare"))?.as_str().chars().next()?;
  let question = collapse_whitespace(&cap["question"]);
  if question.is_empty() {
    return None;
  }
  Some(RawMcq {
    ordinal,
    question,
    option_a: collapse_whitespace(&cap["a"]),
    option_b: collapse_whitespace(&cap["b"]),
    option_c: collapse_whitespace(&cap["c"]),
    option_d: collapse_whitespace(&cap["d"]),
    correct_option: Some(letter.to_ascii_lowercase()),
    description: None,
    layout: Layout::AnsweredInline,
  })
}
