use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::insight::Insight;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisType {
    Coding,
    Portfolio,
    Resume,
}

impl AnalysisType {
    pub const ALL: [AnalysisType; 3] = [
        AnalysisType::Coding,
        AnalysisType::Portfolio,
        AnalysisType::Resume,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisType::Coding => "coding",
            AnalysisType::Portfolio => "portfolio",
            AnalysisType::Resume => "resume",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl AnalysisStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisStatus::Pending => "pending",
            AnalysisStatus::Processing => "processing",
            AnalysisStatus::Completed => "completed",
            AnalysisStatus::Failed => "failed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(AnalysisStatus::Pending),
            "processing" => Some(AnalysisStatus::Processing),
            "completed" => Some(AnalysisStatus::Completed),
            "failed" => Some(AnalysisStatus::Failed),
            _ => None,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("analysis {id} is already {status:?}; only processing records can transition")]
pub struct TransitionError {
    pub id: Uuid,
    pub status: AnalysisStatus,
}

/// One run of one scorer for one user.
///
/// Created as `processing`, then moved to `completed` or `failed` exactly once.
/// Only the most recent completed record per (user, type) feeds readiness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub analysis_type: AnalysisType,
    pub raw_stats: Value,
    pub score: u8,
    pub insight: Option<Insight>,
    /// Full scorer output (sections, keywords, focus topics...).
    pub result: Value,
    pub status: AnalysisStatus,
    pub error: Option<String>,
    pub analyzed_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl AnalysisRecord {
    pub fn start(
        user_id: Uuid,
        analysis_type: AnalysisType,
        raw_stats: Value,
        ttl: Duration,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            analysis_type,
            raw_stats,
            score: 0,
            insight: None,
            result: Value::Null,
            status: AnalysisStatus::Processing,
            error: None,
            analyzed_at: now,
            expires_at: now + ttl,
        }
    }

    /// Marks the record completed and restamps `analyzed_at`, keeping the same TTL span.
    pub fn complete(
        &mut self,
        score: u8,
        insight: Option<Insight>,
        result: Value,
    ) -> Result<(), TransitionError> {
        self.ensure_processing()?;
        let ttl = self.expires_at - self.analyzed_at;
        let now = Utc::now();
        self.score = score.min(100);
        self.insight = insight;
        self.result = result;
        self.status = AnalysisStatus::Completed;
        self.analyzed_at = now;
        self.expires_at = now + ttl;
        Ok(())
    }

    pub fn fail(&mut self, error: impl Into<String>) -> Result<(), TransitionError> {
        self.ensure_processing()?;
        self.status = AnalysisStatus::Failed;
        self.error = Some(error.into());
        Ok(())
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }

    fn ensure_processing(&self) -> Result<(), TransitionError> {
        if self.status == AnalysisStatus::Processing {
            Ok(())
        } else {
            Err(TransitionError {
                id: self.id,
                status: self.status,
            })
        }
    }
}
