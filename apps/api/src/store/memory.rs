use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{AnalysisStore, StoreError};
use crate::analysis::models::{AnalysisRecord, AnalysisStatus, AnalysisType};
use crate::analysis::readiness::ReadinessScore;

/// Process-local store used when no database is configured, and in tests.
#[derive(Default)]
pub struct MemoryAnalysisStore {
    records: RwLock<HashMap<Uuid, AnalysisRecord>>,
    readiness: RwLock<HashMap<Uuid, ReadinessScore>>,
}

impl MemoryAnalysisStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every record for a user, oldest first.
    #[cfg(test)]
    pub async fn records_for(&self, user_id: Uuid) -> Vec<AnalysisRecord> {
        let records = self.records.read().await;
        let mut found: Vec<AnalysisRecord> = records
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        found.sort_by_key(|r| r.analyzed_at);
        found
    }
}

#[async_trait]
impl AnalysisStore for MemoryAnalysisStore {
    async fn save(&self, record: &AnalysisRecord) -> Result<(), StoreError> {
        self.records.write().await.insert(record.id, record.clone());
        Ok(())
    }

    async fn latest_completed(
        &self,
        user_id: Uuid,
        analysis_type: AnalysisType,
    ) -> Result<Option<AnalysisRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .filter(|r| {
                r.user_id == user_id
                    && r.analysis_type == analysis_type
                    && r.status == AnalysisStatus::Completed
            })
            .max_by_key(|r| r.analyzed_at)
            .cloned())
    }

    async fn save_readiness(&self, score: &ReadinessScore) -> Result<(), StoreError> {
        self.readiness
            .write()
            .await
            .insert(score.user_id, score.clone());
        Ok(())
    }

    async fn readiness(&self, user_id: Uuid) -> Result<Option<ReadinessScore>, StoreError> {
        Ok(self.readiness.read().await.get(&user_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    fn record(user: Uuid, analysis_type: AnalysisType) -> AnalysisRecord {
        AnalysisRecord::start(user, analysis_type, json!({}), Duration::days(7))
    }

    #[tokio::test]
    async fn test_save_is_upsert_by_id() {
        let store = MemoryAnalysisStore::new();
        let user = Uuid::new_v4();
        let mut rec = record(user, AnalysisType::Resume);
        store.save(&rec).await.unwrap();
        rec.complete(70, None, json!({})).unwrap();
        store.save(&rec).await.unwrap();

        let all = store.records_for(user).await;
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].status, AnalysisStatus::Completed);
    }

    #[tokio::test]
    async fn test_latest_completed_ignores_other_statuses_and_types() {
        let store = MemoryAnalysisStore::new();
        let user = Uuid::new_v4();

        let mut older = record(user, AnalysisType::Coding);
        older.complete(40, None, json!({})).unwrap();
        store.save(&older).await.unwrap();

        let mut newer = record(user, AnalysisType::Coding);
        newer.complete(60, None, json!({})).unwrap();
        newer.analyzed_at = older.analyzed_at + Duration::seconds(5);
        store.save(&newer).await.unwrap();

        let mut failed = record(user, AnalysisType::Coding);
        failed.fail("boom").unwrap();
        failed.analyzed_at = older.analyzed_at + Duration::seconds(10);
        store.save(&failed).await.unwrap();

        let mut resume = record(user, AnalysisType::Resume);
        resume.complete(90, None, json!({})).unwrap();
        store.save(&resume).await.unwrap();

        let latest = store
            .latest_completed(user, AnalysisType::Coding)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(latest.id, newer.id);
        assert!(store
            .latest_completed(user, AnalysisType::Portfolio)
            .await
            .unwrap()
            .is_none());
        assert!(store
            .latest_completed(Uuid::new_v4(), AnalysisType::Coding)
            .await
            .unwrap()
            .is_none());
    }
}
