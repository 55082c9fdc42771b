//! Document loading: PDF through `pdf-extract`, anything else as UTF-8 text.

use std::path::Path;

use tracing::{debug, instrument};

use crate::error::{PipelineError, Result};

#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub fn load_document_text(path: &Path) -> Result<String> {
  let source_err = |message: String| PipelineError::Source { path: path.to_path_buf(), message };

  let bytes = std::fs::read(path).map_err(|e| source_err(e.to_string()))?;
  let text = if is_pdf(path) {
    pdf_extract::extract_text_from_mem(&bytes).map_err(|e| source_err(format!("pdf extraction: {e}")))?
  } else {
    String::from_utf8(bytes).map_err(|e| source_err(format!("not UTF-8 text: {e}")))?
  };

  debug!(target: "pipeline", chars = text.len(), "Document text loaded");
  Ok(text)
}

fn is_pdf(path: &Path) -> bool {
  path.extension().and_then(|e| e.to_str()).is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}
