//! MCQ extraction from semi-structured chapter documents.
//!
//! Pipeline stages, leaves first: `normalize` → `sections` → `answers` + `solutions` →
//! `mcq` → `expression` → `sanitize`, driven by `pipeline::Extractor`. `generic` covers
//! documents that print the answer after each question. `source` and `export` are the
//! file-facing edges; `routes` exposes the pipeline over HTTP.

pub mod answers;
pub mod config;
pub mod domain;
pub mod error;
pub mod export;
pub mod expression;
pub mod generic;
pub mod mcq;
pub mod normalize;
pub mod pipeline;
pub mod protocol;
pub mod routes;
pub mod sanitize;
pub mod sections;
pub mod solutions;
pub mod source;
pub mod state;
pub mod telemetry;
pub mod util;

pub use error::{PipelineError, Result};
pub use pipeline::{DocumentReport, Extraction, Extractor};
