//! Text normalization shared by every stage.
//!
//! `normalize` produces a single line; `normalize_multiline` keeps line structure
//! (used for solution text). Both are idempotent.

use unicode_normalization::UnicodeNormalization;

const REPLACEMENT_CHAR: char = '\u{FFFD}';

/// NFKC, drop U+FFFD, collapse all whitespace runs to one space, trim.
pub fn normalize(text: &str) -> String {
  collapse_whitespace(&canonical(text))
}

/// NFKC, drop U+FFFD, then per line: collapse horizontal whitespace and trim.
/// Runs of blank lines are capped at one; leading/trailing blank lines are removed.
pub fn normalize_multiline(text: &str) -> String {
  let canon = canonical(text).replace("\r\n", "\n").replace('\r', "\n");

  let mut out: Vec<String> = Vec::new();
  let mut pending_blank = false;
  for line in canon.split('\n') {
    let line = collapse_horizontal(line);
    if line.is_empty() {
      pending_blank = !out.is_empty();
      continue;
    }
    if pending_blank {
      out.push(String::new());
      pending_blank = false;
    }
    out.push(line);
  }
  out.join("\n")
}

/// Whitespace collapse only; no Unicode rewriting.
pub fn collapse_whitespace(text: &str) -> String {
  text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// Replacement chars go first so they cannot block composition of their neighbours.
fn canonical(text: &str) -> String {
  text.chars().filter(|c| *c != REPLACEMENT_CHAR).nfkc().collect()
}

fn collapse_horizontal(line: &str) -> String {
  line
    .split(|c: char| c.is_whitespace() && c != '\n')
    .filter(|s| !s.is_empty())
    .collect::<Vec<_>>()
    .join(" ")
}

#[cfg(test)]
mod tests {
  use super::*;
  use proptest::prelude::*;

  #[test]
  fn collapses_and_trims() {
    assert_eq!(normalize("  What   is\n\twork?  "), "What is work?");
  }

  #[test]
  fn applies_nfkc_and_strips_replacement_chars() {
    assert_eq!(normalize("ﬁeld\u{00A0}strength"), "field strength");
    assert_eq!(normalize("x\u{FFFD}² m"), "x2 m");
    assert_eq!(normalize("e\u{FFFD}\u{0301}"), "\u{e9}");
  }

  #[test]
  fn multiline_caps_blank_runs() {
    let text = "\n\n  Work   done\tis  \n\n\n\nzero  here \n \n";
    assert_eq!(normalize_multiline(text), "Work done is\n\nzero here");
  }

  #[test]
  fn multiline_handles_carriage_returns() {
    assert_eq!(normalize_multiline("a\r\nb\rc"), "a\nb\nc");
  }

  proptest! {
    #[test]
    fn normalize_is_idempotent(s in "[a-zA-Z0-9 \t\n\r\u{00A0}\u{3000}\u{FFFD}\u{0301}\u{00A8}\u{00E9}\u{FB01}\u{00B2}()\\[\\].-]{0,48}") {
      let once = normalize(&s);
      prop_assert_eq!(normalize(&once), once);
    }

    #[test]
    fn normalize_multiline_is_idempotent(s in "[a-zA-Z0-9 \t\n\r\u{00A0}\u{FFFD}\u{0301}\u{FB01}]{0,48}") {
      let once = normalize_multiline(&s);
      prop_assert_eq!(normalize_multiline(&once), once);
    }
  }
}
