pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::analysis::models::{AnalysisRecord, AnalysisType};
use crate::analysis::readiness::ReadinessScore;

pub use memory::MemoryAnalysisStore;
pub use postgres::PgAnalysisStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Corrupt row: {0}")]
    Corrupt(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence for analysis records and readiness snapshots.
///
/// `save` is an upsert keyed on the record id, so a processing record and its
/// completed or failed successor occupy one row.
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    async fn save(&self, record: &AnalysisRecord) -> Result<(), StoreError>;

    /// Most recently analyzed `completed` record for (user, type), expired or not.
    async fn latest_completed(
        &self,
        user_id: Uuid,
        analysis_type: AnalysisType,
    ) -> Result<Option<AnalysisRecord>, StoreError>;

    /// Replaces the user's single readiness snapshot.
    async fn save_readiness(&self, score: &ReadinessScore) -> Result<(), StoreError>;

    async fn readiness(&self, user_id: Uuid) -> Result<Option<ReadinessScore>, StoreError>;
}
