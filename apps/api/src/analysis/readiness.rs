//! Readiness Aggregator.
//!
//! Combines the latest completed score of each analysis type with the role's weight
//! triple, renormalizing over the analyses that count. A zero score counts as
//! "not analyzed yet" and drops out of both numerator and denominator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::analysis::clamp_score;
use crate::analysis::models::AnalysisType;
use crate::roles::{resolve_role, Weights};
use crate::store::{AnalysisStore, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessLevel {
    Beginner,
    Developing,
    Proficient,
    JobReady,
}

impl ReadinessLevel {
    pub fn for_score(overall: u8) -> Self {
        match overall {
            0..=39 => ReadinessLevel::Beginner,
            40..=59 => ReadinessLevel::Developing,
            60..=79 => ReadinessLevel::Proficient,
            _ => ReadinessLevel::JobReady,
        }
    }
}

/// The user's single current readiness snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadinessScore {
    pub user_id: Uuid,
    pub overall: u8,
    pub coding_score: u8,
    pub portfolio_score: u8,
    pub resume_score: u8,
    pub weights: Weights,
    /// Resolved role category id, not the free-text name.
    pub target_role: String,
    pub level: ReadinessLevel,
    pub last_calculated: DateTime<Utc>,
}

fn weight_for(weights: &Weights, analysis_type: AnalysisType) -> f64 {
    match analysis_type {
        AnalysisType::Coding => weights.coding,
        AnalysisType::Portfolio => weights.portfolio,
        AnalysisType::Resume => weights.resume,
    }
}

/// Weighted mean over the scores that count. Nothing counted gives 0.
pub fn aggregate(scores: &[(AnalysisType, u8)], weights: &Weights) -> u8 {
    let (weighted, total_weight) = scores
        .iter()
        .filter(|(_, score)| *score > 0)
        .fold((0.0, 0.0), |(sum, total), (analysis_type, score)| {
            let weight = weight_for(weights, *analysis_type);
            (sum + f64::from(*score) * weight, total + weight)
        });

    if total_weight <= 0.0 {
        return 0;
    }
    clamp_score(weighted / total_weight)
}

/// Reads the latest completed record per type, aggregates, and replaces the snapshot.
pub async fn recalculate(
    store: &dyn AnalysisStore,
    user_id: Uuid,
    target_role: &str,
) -> Result<ReadinessScore, StoreError> {
    let profile = resolve_role(target_role);
    let now = Utc::now();

    let mut scores = Vec::with_capacity(AnalysisType::ALL.len());
    for analysis_type in AnalysisType::ALL {
        let Some(record) = store.latest_completed(user_id, analysis_type).await? else {
            continue;
        };
        if record.is_expired(now) {
            warn!(
                "Latest {} analysis for user {user_id} expired at {}; using it until refreshed",
                analysis_type.as_str(),
                record.expires_at
            );
        }
        scores.push((analysis_type, record.score));
    }

    let score_of = |wanted: AnalysisType| {
        scores
            .iter()
            .find(|(t, _)| *t == wanted)
            .map_or(0, |(_, s)| *s)
    };
    let overall = aggregate(&scores, &profile.weights);

    let snapshot = ReadinessScore {
        user_id,
        overall,
        coding_score: score_of(AnalysisType::Coding),
        portfolio_score: score_of(AnalysisType::Portfolio),
        resume_score: score_of(AnalysisType::Resume),
        weights: profile.weights,
        target_role: profile.category.as_str().to_string(),
        level: ReadinessLevel::for_score(overall),
        last_calculated: now,
    };

    store.save_readiness(&snapshot).await?;
    info!(
        "Readiness for user {user_id}: {overall} ({} analyses counted, role {})",
        scores.iter().filter(|(_, s)| *s > 0).count(),
        snapshot.target_role
    );
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::models::AnalysisRecord;
    use crate::store::MemoryAnalysisStore;
    use chrono::Duration;
    use serde_json::json;

    const SDE: Weights = Weights {
        coding: 0.50,
        portfolio: 0.25,
        resume: 0.25,
    };

    #[test]
    fn test_single_analysis_ignores_weights() {
        assert_eq!(aggregate(&[(AnalysisType::Resume, 80)], &SDE), 80);
    }

    #[test]
    fn test_nothing_counted_is_zero() {
        assert_eq!(aggregate(&[], &SDE), 0);
        assert_eq!(
            aggregate(&[(AnalysisType::Coding, 0), (AnalysisType::Resume, 0)], &SDE),
            0
        );
    }

    #[test]
    fn test_zero_scores_drop_out_of_the_denominator() {
        // (90 × 0.50 + 60 × 0.25) / 0.75 = 80
        let scores = [
            (AnalysisType::Coding, 90),
            (AnalysisType::Portfolio, 0),
            (AnalysisType::Resume, 60),
        ];
        assert_eq!(aggregate(&scores, &SDE), 80);
    }

    #[test]
    fn test_all_three_weighted() {
        // 40 × 0.5 + 80 × 0.25 + 100 × 0.25 = 65
        let scores = [
            (AnalysisType::Coding, 40),
            (AnalysisType::Portfolio, 80),
            (AnalysisType::Resume, 100),
        ];
        assert_eq!(aggregate(&scores, &SDE), 65);
    }

    #[test]
    fn test_levels() {
        assert_eq!(ReadinessLevel::for_score(0), ReadinessLevel::Beginner);
        assert_eq!(ReadinessLevel::for_score(40), ReadinessLevel::Developing);
        assert_eq!(ReadinessLevel::for_score(79), ReadinessLevel::Proficient);
        assert_eq!(ReadinessLevel::for_score(80), ReadinessLevel::JobReady);
    }

    #[test]
    fn test_output_shape_is_camel_case() {
        let snapshot = ReadinessScore {
            user_id: Uuid::nil(),
            overall: 70,
            coding_score: 70,
            portfolio_score: 0,
            resume_score: 0,
            weights: SDE,
            target_role: "software_engineering".to_string(),
            level: ReadinessLevel::Proficient,
            last_calculated: Utc::now(),
        };
        let value = serde_json::to_value(&snapshot).unwrap();
        for key in [
            "overall",
            "codingScore",
            "portfolioScore",
            "resumeScore",
            "weights",
            "targetRole",
            "lastCalculated",
        ] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert_eq!(value["weights"]["coding"], json!(0.5));
    }

    #[tokio::test]
    async fn test_recalculate_uses_latest_completed_and_persists() {
        let store = MemoryAnalysisStore::new();
        let user = Uuid::new_v4();

        let mut resume =
            AnalysisRecord::start(user, AnalysisType::Resume, json!({}), Duration::days(7));
        resume.complete(80, None, json!({})).unwrap();
        store.save(&resume).await.unwrap();

        // Still processing: must not count.
        let coding =
            AnalysisRecord::start(user, AnalysisType::Coding, json!({}), Duration::days(7));
        store.save(&coding).await.unwrap();

        let snapshot = recalculate(&store, user, "SDE intern").await.unwrap();
        assert_eq!(snapshot.overall, 80);
        assert_eq!(snapshot.resume_score, 80);
        assert_eq!(snapshot.coding_score, 0);
        assert_eq!(snapshot.target_role, "software_engineering");
        assert_eq!(snapshot.weights, SDE);

        let stored = store.readiness(user).await.unwrap().unwrap();
        assert_eq!(stored, snapshot);
    }

    #[tokio::test]
    async fn test_expired_records_still_count() {
        let store = MemoryAnalysisStore::new();
        let user = Uuid::new_v4();

        let mut coding =
            AnalysisRecord::start(user, AnalysisType::Coding, json!({}), Duration::days(7));
        coding.complete(55, None, json!({})).unwrap();
        coding.analyzed_at -= Duration::days(30);
        coding.expires_at -= Duration::days(30);
        store.save(&coding).await.unwrap();

        let snapshot = recalculate(&store, user, "").await.unwrap();
        assert_eq!(snapshot.overall, 55);
        assert_eq!(snapshot.target_role, "general");
    }

    #[tokio::test]
    async fn test_recalculate_with_no_records_is_zero() {
        let store = MemoryAnalysisStore::new();
        let snapshot = recalculate(&store, Uuid::new_v4(), "Data Scientist")
            .await
            .unwrap();
        assert_eq!(snapshot.overall, 0);
        assert_eq!(snapshot.level, ReadinessLevel::Beginner);
    }
}
