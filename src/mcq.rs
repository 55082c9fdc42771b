//! MCQ extraction over the question block.
//!
//! Grammar, per question:
//!
//! ```text
//! anchor     := <line start> 1-3 digits "." whitespace
//! stem       := text up to the first option introducer
//! option x   := "(x)" text up to the next introducer
//! option d   := "(d)" text up to the next anchor or a terminator keyword line
//! ```
//!
//! The block is first cut into chunks at anchors, so a question can never swallow its
//! neighbour. A chunk with no options that is followed by a restarted run of numbered
//! statements (`1.`, `2.`, ...) takes that run into its stem. Inside a chunk the option boundaries come from one of two `OptionLayout`
//! strategies: introducers at line starts (newline dialect) or anywhere in running text
//! (inline dialect). The newline strategy is tried first because it tolerates
//! parenthesized letters inside option text.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, instrument};

use crate::domain::{AnswerKey, Layout, RawMcq, SolutionIndex};
use crate::error::{PipelineError, Result};
use crate::normalize::collapse_whitespace;

static ORDINAL_ANCHOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*(\d{1,3})\.\s+").unwrap());

static INTRODUCER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(\s*([a-d])\s*\)").unwrap());

static LINE_INTRODUCER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*\(\s*([a-d])\s*\)").unwrap());

/// Finds the byte spans of the `(a)`..`(d)` introducers inside one question chunk.
pub trait OptionLayout: Send + Sync {
  fn layout(&self) -> Layout;

  /// Spans of the four introducers in order, or `None` if the chunk does not fit.
  fn introducers(&self, chunk: &str) -> Option<[Range<usize>; 4]>;
}

/// Each option on its own line.
pub struct NewlineLayout;

impl OptionLayout for NewlineLayout {
  fn layout(&self) -> Layout { Layout::Newline }

  fn introducers(&self, chunk: &str) -> Option<[Range<usize>; 4]> {
    in_sequence(LINE_INTRODUCER.captures_iter(chunk).filter_map(|cap| {
      let letter = cap[1].chars().next()?;
      Some((letter, cap.get(0)?.range()))
    }))
  }
}

/// Options following each other in running text.
pub struct InlineLayout;

impl OptionLayout for InlineLayout {
  fn layout(&self) -> Layout { Layout::Inline }

  fn introducers(&self, chunk: &str) -> Option<[Range<usize>; 4]> {
    in_sequence(INTRODUCER.captures_iter(chunk).filter_map(|cap| {
      let letter = cap[1].chars().next()?;
      Some((letter, cap.get(0)?.range()))
    }))
  }
}

/// First `a`, then the first `b` after it, and so on. Out-of-order letters are skipped,
/// the same way a lazy `(a).*?(b).*?(c).*?(d)` scan would.
fn in_sequence(found: impl Iterator<Item = (char, Range<usize>)>) -> Option<[Range<usize>; 4]> {
  let mut spans: Vec<Range<usize>> = Vec::with_capacity(4);
  for (letter, span) in found {
    let expected = (b'a' + spans.len() as u8) as char;
    if letter == expected {
      spans.push(span);
      if spans.len() == 4 {
        break;
      }
    }
  }
  spans.try_into().ok()
}

/// Result of scanning a question block.
#[derive(Clone, Debug, Default)]
pub struct McqScan {
  pub mcqs: Vec<RawMcq>,
  /// Ordinals of anchors whose chunk held no complete option set.
  pub skipped: Vec<u32>,
}

pub struct McqParser {
  layouts: Vec<Box<dyn OptionLayout>>,
  terminator: Option<Regex>,
}

impl McqParser {
  /// Parser with both dialects and the given option-(d) terminator keywords.
  pub fn new(terminators: &[String]) -> Result<Self> {
    Ok(Self {
      layouts: vec![Box::new(NewlineLayout), Box::new(InlineLayout)],
      terminator: terminator_regex(terminators)?,
    })
  }

  pub fn with_layouts(layouts: Vec<Box<dyn OptionLayout>>, terminators: &[String]) -> Result<Self> {
    Ok(Self { layouts, terminator: terminator_regex(terminators)? })
  }

  #[instrument(level = "debug", skip_all, fields(block_len = block.len(), answers = answers.len(), solutions = solutions.len()))]
  pub fn scan(&self, block: &str, answers: &AnswerKey, solutions: &SolutionIndex) -> McqScan {
    let anchors: Vec<(u32, usize, usize)> = ORDINAL_ANCHOR
      .captures_iter(block)
      .filter_map(|cap| {
        let whole = cap.get(0)?;
        Some((cap[1].parse::<u32>().ok()?, whole.start(), whole.end()))
      })
      .collect();
    // (ordinal, body start, body end)
    let spans: Vec<(u32, usize, usize)> = anchors
      .iter()
      .enumerate()
      .map(|(i, &(ordinal, _, body_start))| {
        let body_end = anchors.get(i + 1).map(|(_, start, _)| *start).unwrap_or(block.len());
        (ordinal, body_start, body_end)
      })
      .collect();

    let mut scan = McqScan::default();
    let mut i = 0;
    while i < spans.len() {
      let (ordinal, start, end) = spans[i];
      let (parsed, last) = match self.parse_chunk(ordinal, &block[start..end]) {
        Some(mcq) => (Some(mcq), i),
        None => self.fold_statements(block, &spans, i),
      };

      match parsed {
        Some(mut mcq) => {
          mcq.correct_option = answers.get(&ordinal).copied();
          mcq.description = solutions.get(&ordinal).cloned();
          scan.mcqs.push(mcq);
        }
        None => {
          debug!(target: "pipeline", ordinal, chunk_len = end - start, "No complete option set after anchor; skipped");
          scan.skipped.push(ordinal);
        }
      }
      i = last + 1;
    }
    scan
  }

  /// Retries an incomplete chunk with the numbered statements that follow it folded into
  /// its stem. A statement run starts at an ordinal no greater than the question's own and
  /// counts up by one; the next question (`ordinal + 1`) never starts a run. Returns the
  /// record and the index of the last span it consumed.
  fn fold_statements(&self, block: &str, spans: &[(u32, usize, usize)], i: usize) -> (Option<RawMcq>, usize) {
    let (ordinal, start, _) = spans[i];
    let mut expected = None;
    for (j, &(inner, _, end)) in spans.iter().enumerate().skip(i + 1) {
      let continues = match expected {
        None => inner <= ordinal,
        Some(next) => inner == next,
      };
      if !continues {
        break;
      }
      expected = Some(inner + 1);
      if let Some(mcq) = self.parse_chunk(ordinal, &block[start..end]) {
        debug!(target: "pipeline", ordinal, statements = j - i, "Numbered statements folded into stem");
        return (Some(mcq), j);
      }
    }
    (None, i)
  }

  pub fn extract(&self, block: &str, answers: &AnswerKey, solutions: &SolutionIndex) -> Vec<RawMcq> {
    self.scan(block, answers, solutions).mcqs
  }

  fn parse_chunk(&self, ordinal: u32, chunk: &str) -> Option<RawMcq> {
    self.layouts.iter().find_map(|layout| {
      let [a, b, c, d] = layout.introducers(chunk)?;
      // find_at keeps `^` tied to real line starts inside the chunk
      let d_end = self
        .terminator
        .as_ref()
        .and_then(|re| re.find_at(chunk, d.end))
        .map(|m| m.start())
        .unwrap_or(chunk.len());

      Some(RawMcq {
        ordinal,
        question: collapse_whitespace(&chunk[..a.start]),
        option_a: collapse_whitespace(&chunk[a.end..b.start]),
        option_b: collapse_whitespace(&chunk[b.end..c.start]),
        option_c: collapse_whitespace(&chunk[c.end..d.start]),
        option_d: collapse_whitespace(&chunk[d.end..d_end]),
        correct_option: None,
        description: None,
        layout: layout.layout(),
      })
    })
  }
}

fn terminator_regex(terminators: &[String]) -> Result<Option<Regex>> {
  let words: Vec<String> = terminators
    .iter()
    .map(|t| t.trim())
    .filter(|t| !t.is_empty())
    .map(|t| {
      let word_end = t.chars().last().is_some_and(|c| c.is_alphanumeric() || c == '_');
      if word_end { format!(r"{}\b", regex::escape(t)) } else { regex::escape(t) }
    })
    .collect();
  if words.is_empty() {
    return Ok(None);
  }
  let pattern = format!(r"(?m)^[ \t]*(?:{})", words.join("|"));
  Regex::new(&pattern)
    .map(Some)
    .map_err(|e| PipelineError::Config(format!("bad terminator pattern: {e}")))
}

static DEFAULT_PARSER: Lazy<McqParser> = Lazy::new(|| {
  let terminators = crate::config::ExtractorConfig::default().terminators;
  McqParser::new(&terminators).unwrap()
});

/// Extract with the default dialects and terminators.
pub fn extract_mcqs(block: &str, answers: &AnswerKey, solutions: &SolutionIndex) -> Vec<RawMcq> {
  DEFAULT_PARSER.extract(block, answers, solutions)
}
