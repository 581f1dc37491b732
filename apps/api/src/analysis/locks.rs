use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

use super::models::AnalysisType;

/// One async mutex per (user, analysis type), so writes that feed the
/// "latest completed" read are serialized per key.
#[derive(Clone, Default)]
pub struct WriterLocks {
    slots: Arc<Mutex<HashMap<(Uuid, AnalysisType), Arc<AsyncMutex<()>>>>>,
}

impl WriterLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other writer holds (user, type). The guard releases on drop.
    pub async fn acquire(&self, user_id: Uuid, analysis_type: AnalysisType) -> OwnedMutexGuard<()> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
            // Drop slots nobody is holding or waiting on.
            slots.retain(|_, slot| Arc::strong_count(slot) > 1);
            slots
                .entry((user_id, analysis_type))
                .or_default()
                .clone()
        };
        slot.lock_owned().await
    }

    #[cfg(test)]
    fn slot_count(&self) -> usize {
        self.slots.lock().map(|s| s.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_key_is_serialized() {
        let locks = WriterLocks::new();
        let user = Uuid::new_v4();

        let guard = locks.acquire(user, AnalysisType::Resume).await;
        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire(user, AnalysisType::Resume).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());
        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), contender)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_different_keys_do_not_block() {
        let locks = WriterLocks::new();
        let user = Uuid::new_v4();

        let _coding = locks.acquire(user, AnalysisType::Coding).await;
        let portfolio = tokio::time::timeout(
            Duration::from_millis(100),
            locks.acquire(user, AnalysisType::Portfolio),
        )
        .await;
        assert!(portfolio.is_ok());
    }

    #[tokio::test]
    async fn test_released_slots_are_pruned() {
        let locks = WriterLocks::new();
        for _ in 0..5 {
            let _guard = locks.acquire(Uuid::new_v4(), AnalysisType::Coding).await;
        }
        // The last acquire pruned the earlier, released slots.
        assert_eq!(locks.slot_count(), 1);
    }
}
