//! Answer-key extraction: `<ordinal>. (<letter>)` tokens inside the solution block.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, instrument};

use crate::domain::AnswerKey;

/// One answer-key token, e.g. `12. (c)` or `3.(B)`.
pub(crate) static ANSWER_TOKEN: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"(\d+)\.\s*\(\s*([a-dA-D])\s*\)").unwrap());

/// Build the answer key from an (already region-scoped) block.
///
/// Ordinals repeat when a block conflates several sub-sections; the later token in
/// text order wins.
#[instrument(level = "debug", skip(block), fields(block_len = block.len()))]
pub fn extract_answers(block: &str) -> AnswerKey {
  let mut answers = AnswerKey::new();
  for cap in ANSWER_TOKEN.captures_iter(block) {
    let Ok(ordinal) = cap[1].parse::<u32>() else { continue };
    let letter = cap[2].chars().next().map(|c| c.to_ascii_lowercase());
    if let Some(letter) = letter {
      if let Some(prev) = answers.insert(ordinal, letter) {
        debug!(target: "pipeline", ordinal, %prev, %letter, "Answer key ordinal repeated; keeping the later letter");
      }
    }
  }
  answers
}
