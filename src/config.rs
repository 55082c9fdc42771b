//! Loading pipeline configuration (markers, terminators, batch documents) from TOML.
//!
//! See `PipelineConfig` and `ExtractorConfig` for the expected schema. Every field has
//! a default, so an empty file (or no file) yields a working extractor.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{error, info};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct PipelineConfig {
  #[serde(default)]
  pub extractor: ExtractorConfig,
  #[serde(default)]
  pub documents: Vec<DocumentJob>,
}

/// Which document dialect the extractor expects.
#[derive(Clone, Copy, Debug, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMode {
  /// Question section + SOLUTIONS section, paired by ordinal.
  #[default]
  Sectioned,
  /// Questions carrying their own `Ans: (x)` tag, no section markers.
  InlineAnswers,
  /// Sectioned first; inline answers when no question section exists.
  Auto,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
  pub mode: ExtractionMode,
  pub min_question_chars: usize,
  /// Line-leading keywords that end option (d) early ("Match", "Codes", ...).
  pub terminators: Vec<String>,
  pub markers: Markers,
}

impl Default for ExtractorConfig {
  fn default() -> Self {
    Self {
      mode: ExtractionMode::Sectioned,
      min_question_chars: 5,
      terminators: ["Match", "Codes", "Explanation", "Directions"].map(String::from).to_vec(),
      markers: Markers::default(),
    }
  }
}

/// Literal section titles used to cut a document into regions.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Markers {
  /// Any of these opens the multiple-choice section; the earliest occurrence wins.
  pub question_sections: Vec<String>,
  /// Sections that follow the multiple-choice section and close it.
  pub section_ends: Vec<String>,
  pub solutions: String,
}

impl Default for Markers {
  fn default() -> Self {
    Self {
      question_sections: vec!["Multiple Choice Questions".into(), "Multiple-Choice Questions".into()],
      section_ends: vec!["Assertion-Reasoning MCQs".into()],
      solutions: "SOLUTIONS".into(),
    }
  }
}

/// One entry of the batch driver's work list.
#[derive(Clone, Debug, Deserialize)]
pub struct DocumentJob {
  pub path: PathBuf,
  pub chapter_id: String,
  #[serde(default)] pub chapter_name: Option<String>,
  #[serde(default)] pub csv_out: Option<PathBuf>,
  #[serde(default)] pub json_out: Option<PathBuf>,
}

impl DocumentJob {
  /// Explicit name, or the file stem (`"units and measurements.pdf"` → `"units and measurements"`).
  pub fn chapter_name(&self) -> String {
    self.chapter_name.clone().unwrap_or_else(|| {
      self.path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
    })
  }

  /// Explicit CSV path, or `<file>.csv` next to the source.
  pub fn csv_path(&self) -> PathBuf {
    self.csv_out.clone().unwrap_or_else(|| {
      let mut name = self.path.as_os_str().to_owned();
      name.push(".csv");
      PathBuf::from(name)
    })
  }
}

pub fn parse_config(s: &str) -> Result<PipelineConfig, toml::de::Error> {
  toml::from_str::<PipelineConfig>(s)
}

/// Read and parse a config file. On any parsing/IO error, logs and returns None.
pub fn load_config(path: &Path) -> Option<PipelineConfig> {
  match std::fs::read_to_string(path) {
    Ok(s) => match parse_config(&s) {
      Ok(cfg) => {
        info!(target: "mcq_extract", path = %path.display(), documents = cfg.documents.len(), "Loaded pipeline config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "mcq_extract", path = %path.display(), error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "mcq_extract", path = %path.display(), error = %e, "Failed to read TOML config file");
      None
    }
  }
}

/// Attempt to load `PipelineConfig` from EXTRACT_CONFIG_PATH.
pub fn load_config_from_env() -> Option<PipelineConfig> {
  let path = std::env::var("EXTRACT_CONFIG_PATH").ok()?;
  load_config(Path::new(&path))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_config_uses_defaults() {
    let cfg = parse_config("").unwrap();
    assert_eq!(cfg.extractor.mode, ExtractionMode::Sectioned);
    assert_eq!(cfg.extractor.min_question_chars, 5);
    assert_eq!(cfg.extractor.markers.solutions, "SOLUTIONS");
    assert!(cfg.documents.is_empty());
  }

  #[test]
  fn parses_documents_and_overrides() {
    let cfg = parse_config(
      r#"
        [extractor]
        mode = "auto"
        terminators = ["Codes"]

        [extractor.markers]
        question_sections = ["MCQs"]

        [[documents]]
        path = "data/units and measurements.pdf"
        chapter_id = "b89cc0b0-2acd-4003-9c61-dbc771402574"

        [[documents]]
        path = "data/thermo.txt"
        chapter_id = "b89cc0b0-2acd-4003-9c61-dbc771402576"
        chapter_name = "Thermodynamics"
        csv_out = "out/thermo.csv"
      "#,
    )
    .unwrap();

    assert_eq!(cfg.extractor.mode, ExtractionMode::Auto);
    assert_eq!(cfg.extractor.terminators, vec!["Codes".to_string()]);
    assert_eq!(cfg.extractor.markers.question_sections, vec!["MCQs".to_string()]);
    // untouched fields keep their defaults
    assert_eq!(cfg.extractor.markers.solutions, "SOLUTIONS");
    assert_eq!(cfg.extractor.min_question_chars, 5);

    assert_eq!(cfg.documents[0].chapter_name(), "units and measurements");
    assert_eq!(cfg.documents[0].csv_path(), PathBuf::from("data/units and measurements.pdf.csv"));
    assert_eq!(cfg.documents[1].chapter_name(), "Thermodynamics");
    assert_eq!(cfg.documents[1].csv_path(), PathBuf::from("out/thermo.csv"));
  }

  #[test]
  fn load_config_returns_none_for_missing_file() {
    assert!(load_config(Path::new("/definitely/not/here.toml")).is_none());
  }
}
