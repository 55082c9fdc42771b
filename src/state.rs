//! Application state: the compiled extractor and service counters.
//!
//! The extractor is built once at startup from `EXTRACT_CONFIG_PATH` (or defaults) and
//! shared read-only across requests. Counters are the only mutable state.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, instrument};

use crate::config::{load_config_from_env, ExtractorConfig};
use crate::error::Result;
use crate::pipeline::Extractor;
use crate::protocol::StatsOut;

#[derive(Clone)]
pub struct AppState {
    pub extractor: Arc<Extractor>,
    pub stats: Arc<RwLock<StatsOut>>,
}

impl AppState {
    /// Build state from env: load config if present, compile the extractor.
    #[instrument(level = "info", skip_all)]
    pub fn from_env() -> Result<Self> {
        let config = load_config_from_env().map(|c| c.extractor).unwrap_or_default();
        Self::with_config(config)
    }

    pub fn with_config(config: ExtractorConfig) -> Result<Self> {
        info!(
            target: "mcq_extract",
            mode = ?config.mode,
            question_markers = ?config.markers.question_sections,
            min_question_chars = config.min_question_chars,
            "Extractor configured"
        );
        Ok(Self {
            extractor: Arc::new(Extractor::new(config)?),
            stats: Arc::new(RwLock::new(StatsOut::default())),
        })
    }

    pub async fn record_success(&self, records: usize) {
        let mut stats = self.stats.write().await;
        stats.documents_processed += 1;
        stats.records_emitted += records as u64;
    }

    pub async fn record_failure(&self) {
        self.stats.write().await.documents_failed += 1;
    }

    pub async fn stats(&self) -> StatsOut {
        *self.stats.read().await
    }
}
