use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use tracing::debug;
use uuid::Uuid;

use super::{AnalysisStore, StoreError};
use crate::analysis::models::{AnalysisRecord, AnalysisStatus, AnalysisType};
use crate::analysis::readiness::{ReadinessLevel, ReadinessScore};
use crate::roles::Weights;

#[derive(Clone)]
pub struct PgAnalysisStore {
    pool: PgPool,
}

impl PgAnalysisStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct AnalysisRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub analysis_type: String,
    pub raw_stats: Value,
    pub score: i16,
    pub insight: Option<Value>,
    pub result: Value,
    pub status: String,
    pub error: Option<String>,
    pub analyzed_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl TryFrom<AnalysisRow> for AnalysisRecord {
    type Error = StoreError;

    fn try_from(row: AnalysisRow) -> Result<Self, Self::Error> {
        let analysis_type = AnalysisType::parse(&row.analysis_type).ok_or_else(|| {
            StoreError::Corrupt(format!("unknown analysis type '{}'", row.analysis_type))
        })?;
        let status = AnalysisStatus::parse(&row.status)
            .ok_or_else(|| StoreError::Corrupt(format!("unknown status '{}'", row.status)))?;
        let insight = row.insight.map(serde_json::from_value).transpose()?;

        Ok(AnalysisRecord {
            id: row.id,
            user_id: row.user_id,
            analysis_type,
            raw_stats: row.raw_stats,
            score: score_from_column(row.score)?,
            insight,
            result: row.result,
            status,
            error: row.error,
            analyzed_at: row.analyzed_at,
            expires_at: row.expires_at,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ReadinessRow {
    pub user_id: Uuid,
    pub overall: i16,
    pub coding_score: i16,
    pub portfolio_score: i16,
    pub resume_score: i16,
    pub coding_weight: f64,
    pub portfolio_weight: f64,
    pub resume_weight: f64,
    pub target_role: String,
    pub last_calculated: DateTime<Utc>,
}

impl TryFrom<ReadinessRow> for ReadinessScore {
    type Error = StoreError;

    fn try_from(row: ReadinessRow) -> Result<Self, Self::Error> {
        let overall = score_from_column(row.overall)?;
        Ok(ReadinessScore {
            user_id: row.user_id,
            overall,
            coding_score: score_from_column(row.coding_score)?,
            portfolio_score: score_from_column(row.portfolio_score)?,
            resume_score: score_from_column(row.resume_score)?,
            weights: Weights {
                coding: row.coding_weight,
                portfolio: row.portfolio_weight,
                resume: row.resume_weight,
            },
            target_role: row.target_role,
            level: ReadinessLevel::for_score(overall),
            last_calculated: row.last_calculated,
        })
    }
}

fn score_from_column(raw: i16) -> Result<u8, StoreError> {
    u8::try_from(raw)
        .ok()
        .filter(|s| *s <= 100)
        .ok_or_else(|| StoreError::Corrupt(format!("score {raw} outside 0..=100")))
}

#[async_trait]
impl AnalysisStore for PgAnalysisStore {
    async fn save(&self, record: &AnalysisRecord) -> Result<(), StoreError> {
        let insight = record.insight.as_ref().map(serde_json::to_value).transpose()?;

        sqlx::query(
            r#"
            INSERT INTO analysis_records
                (id, user_id, analysis_type, raw_stats, score, insight, result,
                 status, error, analyzed_at, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (id) DO UPDATE SET
                score       = EXCLUDED.score,
                insight     = EXCLUDED.insight,
                result      = EXCLUDED.result,
                status      = EXCLUDED.status,
                error       = EXCLUDED.error,
                analyzed_at = EXCLUDED.analyzed_at,
                expires_at  = EXCLUDED.expires_at
            "#,
        )
        .bind(record.id)
        .bind(record.user_id)
        .bind(record.analysis_type.as_str())
        .bind(&record.raw_stats)
        .bind(i16::from(record.score))
        .bind(insight)
        .bind(&record.result)
        .bind(record.status.as_str())
        .bind(record.error.as_deref())
        .bind(record.analyzed_at)
        .bind(record.expires_at)
        .execute(&self.pool)
        .await?;

        debug!(
            "Saved {} analysis {} as {}",
            record.analysis_type.as_str(),
            record.id,
            record.status.as_str()
        );
        Ok(())
    }

    async fn latest_completed(
        &self,
        user_id: Uuid,
        analysis_type: AnalysisType,
    ) -> Result<Option<AnalysisRecord>, StoreError> {
        let row = sqlx::query_as::<_, AnalysisRow>(
            r#"
            SELECT * FROM analysis_records
            WHERE user_id = $1 AND analysis_type = $2 AND status = 'completed'
            ORDER BY analyzed_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(analysis_type.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(AnalysisRecord::try_from).transpose()
    }

    async fn save_readiness(&self, score: &ReadinessScore) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO readiness_scores
                (user_id, overall, coding_score, portfolio_score, resume_score,
                 coding_weight, portfolio_weight, resume_weight, target_role, last_calculated)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (user_id) DO UPDATE SET
                overall          = EXCLUDED.overall,
                coding_score     = EXCLUDED.coding_score,
                portfolio_score  = EXCLUDED.portfolio_score,
                resume_score     = EXCLUDED.resume_score,
                coding_weight    = EXCLUDED.coding_weight,
                portfolio_weight = EXCLUDED.portfolio_weight,
                resume_weight    = EXCLUDED.resume_weight,
                target_role      = EXCLUDED.target_role,
                last_calculated  = EXCLUDED.last_calculated
            "#,
        )
        .bind(score.user_id)
        .bind(i16::from(score.overall))
        .bind(i16::from(score.coding_score))
        .bind(i16::from(score.portfolio_score))
        .bind(i16::from(score.resume_score))
        .bind(score.weights.coding)
        .bind(score.weights.portfolio)
        .bind(score.weights.resume)
        .bind(&score.target_role)
        .bind(score.last_calculated)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn readiness(&self, user_id: Uuid) -> Result<Option<ReadinessScore>, StoreError> {
        let row = sqlx::query_as::<_, ReadinessRow>(
            "SELECT * FROM readiness_scores WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ReadinessScore::try_from).transpose()
    }
}
