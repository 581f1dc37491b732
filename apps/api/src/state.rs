use std::sync::Arc;

use crate::analysis::locks::WriterLocks;
use crate::config::Config;
use crate::insight::FallbackInsight;
use crate::store::AnalysisStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Postgres when `DATABASE_URL` is set, in-memory otherwise.
    pub store: Arc<dyn AnalysisStore>,
    pub insight: FallbackInsight,
    pub locks: WriterLocks,
    pub config: Config,
}
