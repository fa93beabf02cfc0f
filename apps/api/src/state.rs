use std::sync::Arc;

use crate::ats::debounce::Debouncer;
use crate::ats::store::{AnalysisKey, ScoreStore};
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Where settled scores go. Default: `PgScoreStore`.
    pub store: Arc<dyn ScoreStore>,
    /// Coalesces bursts of weight changes per analysis before they are persisted.
    pub debouncer: Debouncer<AnalysisKey>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn ScoreStore>) -> Self {
        let debouncer = Debouncer::new(config.score_debounce);
        Self {
            config,
            store,
            debouncer,
        }
    }
}
