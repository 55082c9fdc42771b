//! Section locator: cuts a raw document into the question block and the solution block
//! using literal marker strings. All marker knowledge lives here; downstream stages only
//! ever see the two blocks.

use tracing::{debug, instrument};

use crate::config::Markers;
use crate::error::{PipelineError, Result};

/// Borrowed regions of one document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sections<'a> {
  pub questions: &'a str,
  /// Empty when the document has no solutions marker.
  pub solutions: &'a str,
}

#[derive(Clone, Debug)]
pub struct SectionLocator {
  markers: Markers,
}

impl SectionLocator {
  pub fn new(markers: Markers) -> Result<Self> {
    if markers.question_sections.iter().all(|m| m.is_empty()) {
      return Err(PipelineError::Config("at least one non-empty question section marker is required".into()));
    }
    if markers.solutions.is_empty() {
      return Err(PipelineError::Config("solutions marker must not be empty".into()));
    }
    Ok(Self { markers })
  }

  pub fn markers(&self) -> &Markers { &self.markers }

  /// Question block: after the earliest question marker, up to the first following
  /// section-end or solutions marker. Solution block: after the first solutions marker
  /// that follows the start of the question block.
  #[instrument(level = "debug", skip(self, text), fields(text_len = text.len()))]
  pub fn locate<'a>(&self, text: &'a str) -> Result<Sections<'a>> {
    let (start, len) = earliest(text, self.question_markers()).ok_or_else(|| PipelineError::SectionNotFound {
      markers: self.markers.question_sections.clone(),
    })?;
    let body = &text[start + len..];

    let end = earliest(body, self.end_markers().chain(std::iter::once(self.markers.solutions.as_str())))
      .map(|(i, _)| i)
      .unwrap_or(body.len());
    let questions = &body[..end];

    let solutions = body
      .find(&self.markers.solutions)
      .map(|i| &body[i + self.markers.solutions.len()..])
      .unwrap_or("");

    debug!(target: "pipeline", question_len = questions.len(), solution_len = solutions.len(), "Sections located");
    Ok(Sections { questions, solutions })
  }

  /// The multiple-choice part of a solution block: after a question marker when the
  /// block repeats one, and before any section-end marker.
  pub fn mcq_region<'a>(&self, solution_block: &'a str) -> &'a str {
    let region = match earliest(solution_block, self.question_markers()) {
      Some((start, len)) => &solution_block[start + len..],
      None => solution_block,
    };
    match earliest(region, self.end_markers()) {
      Some((end, _)) => &region[..end],
      None => region,
    }
  }

  fn question_markers(&self) -> impl Iterator<Item = &str> + '_ {
    self.markers.question_sections.iter().map(String::as_str).filter(|m| !m.is_empty())
  }

  fn end_markers(&self) -> impl Iterator<Item = &str> + '_ {
    self.markers.section_ends.iter().map(String::as_str).filter(|m| !m.is_empty())
  }
}

/// Position and length of the earliest occurrence of any needle.
fn earliest<'n>(hay: &str, needles: impl Iterator<Item = &'n str>) -> Option<(usize, usize)> {
  needles
    .filter_map(|n| hay.find(n).map(|i| (i, n.len())))
    .min_by_key(|(i, _)| *i)
}
