//! Insight providers — optional qualitative judgments layered over the heuristic scores.
//!
//! Scorers only ever talk to [`FallbackInsight`], which bounds the primary provider
//! with a timeout and substitutes the fallback provider's answer on any failure.
//! An `Insight` with every field empty is a normal result, not an error.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::llm_client::{LlmClient, LlmError};

pub mod parse;
pub mod prompts;

// ────────────────────────────────────────────────────────────────────────────
// Data model
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "high" => Some(Priority::High),
            "medium" => Some(Priority::Medium),
            "low" => Some(Priority::Low),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionItem {
    pub action: String,
    pub priority: Priority,
    pub timeline: String,
}

/// Where the narrative of a finished analysis came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightSource {
    Provider,
    #[default]
    Heuristic,
}

/// Qualitative judgment attached to an analysis. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_match_score: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_relevance_score: Option<u8>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub action_plan: Vec<ActionItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub focus_topics: Vec<String>,
    #[serde(default)]
    pub source: InsightSource,
}

impl Insight {
    /// True when the provider supplied any narrative text at all.
    pub fn has_narrative(&self) -> bool {
        self.summary.is_some()
            || !self.strengths.is_empty()
            || !self.weaknesses.is_empty()
            || !self.recommendations.is_empty()
            || !self.action_plan.is_empty()
            || !self.focus_topics.is_empty()
    }

    /// Fills every empty narrative field from `fallback`, keeping provider text where present.
    pub fn or_fallback(self, fallback: Insight) -> Insight {
        let source = if self.has_narrative() {
            InsightSource::Provider
        } else {
            InsightSource::Heuristic
        };
        Insight {
            role_match_score: self.role_match_score.or(fallback.role_match_score),
            project_relevance_score: self
                .project_relevance_score
                .or(fallback.project_relevance_score),
            summary: self.summary.or(fallback.summary),
            strengths: non_empty_or(self.strengths, fallback.strengths),
            weaknesses: non_empty_or(self.weaknesses, fallback.weaknesses),
            recommendations: non_empty_or(self.recommendations, fallback.recommendations),
            action_plan: non_empty_or(self.action_plan, fallback.action_plan),
            focus_topics: non_empty_or(self.focus_topics, fallback.focus_topics),
            source,
        }
    }
}

fn non_empty_or<T>(primary: Vec<T>, fallback: Vec<T>) -> Vec<T> {
    if primary.is_empty() {
        fallback
    } else {
        primary
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsightKind {
    Resume,
    Coding,
    Portfolio,
}

impl InsightKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightKind::Resume => "resume",
            InsightKind::Coding => "coding",
            InsightKind::Portfolio => "portfolio",
        }
    }
}

#[derive(Debug, Clone)]
pub struct InsightRequest {
    pub kind: InsightKind,
    pub input_excerpt: String,
    pub target_role: String,
}

#[derive(Debug, Error)]
pub enum InsightError {
    #[error("provider call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("provider timed out after {0:?}")]
    Timeout(Duration),

    #[error("malformed provider output: {0}")]
    Malformed(String),

    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

// ────────────────────────────────────────────────────────────────────────────
// Provider trait and implementations
// ────────────────────────────────────────────────────────────────────────────

/// A source of qualitative judgments. Implementations may fail freely;
/// callers go through [`FallbackInsight`].
#[async_trait]
pub trait InsightProvider: Send + Sync {
    async fn generate(&self, request: &InsightRequest) -> Result<Insight, InsightError>;
}

/// LLM-backed provider.
pub struct RemoteInsightProvider {
    llm: LlmClient,
}

impl RemoteInsightProvider {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl InsightProvider for RemoteInsightProvider {
    async fn generate(&self, request: &InsightRequest) -> Result<Insight, InsightError> {
        let prompt = prompts::build_prompt(request);
        let raw = self.llm.call_text(&prompt, prompts::INSIGHT_SYSTEM).await?;
        parse::parse_insight(&raw)
    }
}

/// Provider that never has an opinion. Used when no API key is configured and as
/// the fallback half of [`FallbackInsight`].
pub struct NullInsightProvider;

#[async_trait]
impl InsightProvider for NullInsightProvider {
    async fn generate(&self, _request: &InsightRequest) -> Result<Insight, InsightError> {
        Ok(Insight::default())
    }
}

/// Composes a fallible primary provider with a fallback under a hard timeout.
#[derive(Clone)]
pub struct FallbackInsight {
    primary: Arc<dyn InsightProvider>,
    fallback: Arc<dyn InsightProvider>,
    timeout: Duration,
}

impl FallbackInsight {
    pub fn new(primary: Arc<dyn InsightProvider>, timeout: Duration) -> Self {
        Self {
            primary,
            fallback: Arc::new(NullInsightProvider),
            timeout,
        }
    }

    /// A wrapper with no primary opinion at all.
    pub fn disabled() -> Self {
        Self::new(Arc::new(NullInsightProvider), Duration::from_secs(1))
    }

    /// Consults the primary provider. Never fails: timeouts, provider errors and
    /// malformed output all resolve to the fallback provider's insight.
    pub async fn consult(&self, request: &InsightRequest) -> Insight {
        let outcome = match tokio::time::timeout(self.timeout, self.primary.generate(request)).await
        {
            Ok(result) => result,
            Err(_) => Err(InsightError::Timeout(self.timeout)),
        };

        match outcome {
            Ok(insight) => insight,
            Err(e) => {
                warn!(
                    "Insight provider degraded for {} analysis, using fallback: {e}",
                    request.kind.as_str()
                );
                self.fallback
                    .generate(request)
                    .await
                    .unwrap_or_default()
            }
        }
    }
}

/// Test doubles shared by the scorer test modules.
#[cfg(test)]
pub mod testing {
    use super::*;

    /// Always answers with the same raw provider text, run through the real parser.
    pub struct FixedInsightProvider(pub String);

    #[async_trait]
    impl InsightProvider for FixedInsightProvider {
        async fn generate(&self, _request: &InsightRequest) -> Result<Insight, InsightError> {
            parse::parse_insight(&self.0)
        }
    }

    pub struct FailingInsightProvider;

    #[async_trait]
    impl InsightProvider for FailingInsightProvider {
        async fn generate(&self, _request: &InsightRequest) -> Result<Insight, InsightError> {
            Err(InsightError::Unavailable("stubbed outage".to_string()))
        }
    }

    pub struct SlowInsightProvider(pub Duration);

    #[async_trait]
    impl InsightProvider for SlowInsightProvider {
        async fn generate(&self, _request: &InsightRequest) -> Result<Insight, InsightError> {
            tokio::time::sleep(self.0).await;
            Ok(Insight {
                summary: Some("too late".to_string()),
                ..Insight::default()
            })
        }
    }

    pub fn fixed(raw: &str) -> FallbackInsight {
        FallbackInsight::new(
            Arc::new(FixedInsightProvider(raw.to_string())),
            Duration::from_secs(5),
        )
    }

    pub fn failing() -> FallbackInsight {
        FallbackInsight::new(Arc::new(FailingInsightProvider), Duration::from_secs(5))
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    fn request() -> InsightRequest {
        InsightRequest {
            kind: InsightKind::Resume,
            input_excerpt: "Rust engineer".to_string(),
            target_role: "Backend Developer".to_string(),
        }
    }

    #[tokio::test]
    async fn test_consult_returns_primary_insight() {
        let insight = fixed(r#"{"roleMatchScore": 70, "summary": "Fine"}"#)
            .consult(&request())
            .await;
        assert_eq!(insight.role_match_score, Some(70));
        assert_eq!(insight.summary.as_deref(), Some("Fine"));
    }

    #[tokio::test]
    async fn test_consult_degrades_on_error() {
        let insight = failing().consult(&request()).await;
        assert_eq!(insight, Insight::default());
    }

    #[tokio::test]
    async fn test_consult_degrades_on_malformed_output() {
        let insight = fixed("the model rambled without JSON").consult(&request()).await;
        assert_eq!(insight, Insight::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_consult_degrades_on_timeout() {
        let wrapper = FallbackInsight::new(
            Arc::new(SlowInsightProvider(Duration::from_secs(30))),
            Duration::from_millis(200),
        );
        let insight = wrapper.consult(&request()).await;
        assert_eq!(insight.summary, None);
    }

    #[test]
    fn test_or_fallback_keeps_provider_fields_and_fills_gaps() {
        let provider = Insight {
            summary: Some("Provider summary".to_string()),
            ..Insight::default()
        };
        let fallback = Insight {
            summary: Some("Heuristic summary".to_string()),
            strengths: vec!["Skills".to_string()],
            ..Insight::default()
        };
        let merged = provider.or_fallback(fallback);
        assert_eq!(merged.summary.as_deref(), Some("Provider summary"));
        assert_eq!(merged.strengths, vec!["Skills"]);
        assert_eq!(merged.source, InsightSource::Provider);
    }

    #[test]
    fn test_or_fallback_without_provider_text_is_heuristic() {
        let merged = Insight::default().or_fallback(Insight {
            summary: Some("Heuristic summary".to_string()),
            ..Insight::default()
        });
        assert_eq!(merged.source, InsightSource::Heuristic);
    }
}
