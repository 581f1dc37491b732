use std::future::Future;

use chrono::Duration;
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info};
use uuid::Uuid;

use super::locks::WriterLocks;
use super::models::{AnalysisRecord, AnalysisType};
use super::ScoredAnalysis;
use crate::errors::AppError;
use crate::store::AnalysisStore;

/// Runs one scorer under the (user, type) writer lock and persists its lifecycle.
///
/// The record is saved as `processing` before the scorer runs and as `completed`
/// after. If the completed save fails, the record is saved as `failed` on a best
/// effort basis and the original store error is returned.
pub async fn run_analysis<T, F>(
    store: &dyn AnalysisStore,
    locks: &WriterLocks,
    user_id: Uuid,
    analysis_type: AnalysisType,
    raw_stats: Value,
    ttl: Duration,
    scorer: F,
) -> Result<AnalysisRecord, AppError>
where
    T: ScoredAnalysis + Serialize,
    F: Future<Output = T>,
{
    let _writer = locks.acquire(user_id, analysis_type).await;

    let mut record = AnalysisRecord::start(user_id, analysis_type, raw_stats, ttl);
    store.save(&record).await?;

    let output = scorer.await;

    let mut completed = record.clone();
    completed
        .complete(
            output.score(),
            output.insight().cloned(),
            serde_json::to_value(&output).map_err(anyhow::Error::from)?,
        )
        .map_err(anyhow::Error::from)?;

    if let Err(e) = store.save(&completed).await {
        error!(
            "Saving {} analysis {} failed, marking it failed: {e}",
            analysis_type.as_str(),
            record.id
        );
        record.fail(e.to_string()).map_err(anyhow::Error::from)?;
        if let Err(mark_err) = store.save(&record).await {
            error!("Could not mark analysis {} as failed: {mark_err}", record.id);
        }
        return Err(AppError::Store(e));
    }

    info!(
        "{} analysis {} for user {user_id} completed with score {}",
        analysis_type.as_str(),
        completed.id,
        completed.score
    );
    Ok(completed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::models::AnalysisStatus;
    use crate::analysis::readiness::ReadinessScore;
    use crate::insight::Insight;
    use crate::store::{MemoryAnalysisStore, StoreError};
    use async_trait::async_trait;
    use serde_json::json;

    #[derive(Serialize)]
    struct Fixed(u8);

    impl ScoredAnalysis for Fixed {
        fn score(&self) -> u8 {
            self.0
        }

        fn insight(&self) -> Option<&Insight> {
            None
        }
    }

    /// Delegates to memory but rejects saves of completed records.
    struct RejectCompleted(MemoryAnalysisStore);

    #[async_trait]
    impl AnalysisStore for RejectCompleted {
        async fn save(&self, record: &AnalysisRecord) -> Result<(), StoreError> {
            if record.status == AnalysisStatus::Completed {
                return Err(StoreError::Unavailable("disk full".to_string()));
            }
            self.0.save(record).await
        }

        async fn latest_completed(
            &self,
            user_id: Uuid,
            analysis_type: AnalysisType,
        ) -> Result<Option<AnalysisRecord>, StoreError> {
            self.0.latest_completed(user_id, analysis_type).await
        }

        async fn save_readiness(&self, score: &ReadinessScore) -> Result<(), StoreError> {
            self.0.save_readiness(score).await
        }

        async fn readiness(&self, user_id: Uuid) -> Result<Option<ReadinessScore>, StoreError> {
            self.0.readiness(user_id).await
        }
    }

    #[tokio::test]
    async fn test_completed_record_is_persisted() {
        let store = MemoryAnalysisStore::new();
        let locks = WriterLocks::new();
        let user = Uuid::new_v4();

        let record = run_analysis(
            &store,
            &locks,
            user,
            AnalysisType::Coding,
            json!({"total_solved": 3}),
            Duration::days(7),
            async { Fixed(42) },
        )
        .await
        .unwrap();

        assert_eq!(record.status, AnalysisStatus::Completed);
        assert_eq!(record.score, 42);
        assert_eq!(record.result, json!(42));

        let stored = store.records_for(user).await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0], record);
    }

    #[tokio::test]
    async fn test_failed_save_marks_record_failed_and_propagates() {
        let store = RejectCompleted(MemoryAnalysisStore::new());
        let locks = WriterLocks::new();
        let user = Uuid::new_v4();

        let err = run_analysis(
            &store,
            &locks,
            user,
            AnalysisType::Resume,
            json!({}),
            Duration::days(7),
            async { Fixed(90) },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Store(StoreError::Unavailable(_))));

        let stored = store.0.records_for(user).await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].status, AnalysisStatus::Failed);
        assert!(stored[0].error.as_deref().unwrap().contains("disk full"));
        assert!(store
            .latest_completed(user, AnalysisType::Resume)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_concurrent_writes_for_one_key_serialize() {
        let store = std::sync::Arc::new(MemoryAnalysisStore::new());
        let locks = WriterLocks::new();
        let user = Uuid::new_v4();

        let slow = {
            let (store, locks) = (store.clone(), locks.clone());
            tokio::spawn(async move {
                run_analysis(
                    store.as_ref(),
                    &locks,
                    user,
                    AnalysisType::Portfolio,
                    json!({}),
                    Duration::days(7),
                    async {
                        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
                        Fixed(10)
                    },
                )
                .await
            })
        };
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        let fast = run_analysis(
            store.as_ref(),
            &locks,
            user,
            AnalysisType::Portfolio,
            json!({}),
            Duration::days(7),
            async { Fixed(20) },
        )
        .await
        .unwrap();
        slow.await.unwrap().unwrap();

        // The second writer waited for the first, so it completed last and wins.
        let latest = store
            .latest_completed(user, AnalysisType::Portfolio)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(latest.id, fast.id);
        assert_eq!(latest.score, 20);
    }
}
