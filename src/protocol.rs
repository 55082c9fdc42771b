//! Public protocol structs for the HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and clients independently.

use serde::{Deserialize, Serialize};

use crate::domain::SanitizedMcq;
use crate::pipeline::{Counts, DocumentReport};
use crate::sanitize::Rejection;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthOut {
    pub ok: bool,
}

/// One document to run through the pipeline.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExtractIn {
    pub text: String,
    #[serde(rename = "chapterId")]
    pub chapter_id: String,
    #[serde(rename = "chapterName")]
    pub chapter_name: String,
}

#[derive(Debug, Serialize)]
pub struct ExtractOut {
    pub counts: Counts,
    pub records: Vec<SanitizedMcq>,
    pub rejections: Vec<Rejection>,
    /// Ordinals of question anchors that had no complete option set.
    pub skipped: Vec<u32>,
}

impl From<DocumentReport> for ExtractOut {
    fn from(report: DocumentReport) -> Self {
        Self {
            counts: report.counts(),
            records: report.records,
            rejections: report.rejections,
            skipped: report.skipped,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FormatIn {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FormatOut {
    pub formatted: String,
}

/// Counters since process start.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatsOut {
    #[serde(rename = "documentsProcessed")]
    pub documents_processed: u64,
    #[serde(rename = "documentsFailed")]
    pub documents_failed: u64,
    #[serde(rename = "recordsEmitted")]
    pub records_emitted: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorOut {
    pub error: String,
}
