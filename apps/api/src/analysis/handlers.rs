use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::analysis::coding::{analyze_coding, CodingStats};
use crate::analysis::models::{AnalysisRecord, AnalysisType};
use crate::analysis::portfolio::{analyze_portfolio, PortfolioStats};
use crate::analysis::readiness::{recalculate, ReadinessScore};
use crate::analysis::resume::analyze_resume;
use crate::analysis::service::run_analysis;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ResumeRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub target_role: String,
    pub resume_text: String,
}

#[derive(Debug, Deserialize)]
pub struct CodingRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub target_role: String,
    pub stats: CodingStats,
}

#[derive(Debug, Deserialize)]
pub struct PortfolioRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub target_role: String,
    pub stats: PortfolioStats,
}

#[derive(Debug, Deserialize)]
pub struct PracticeAndPortfolioRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub target_role: String,
    pub coding: CodingStats,
    pub portfolio: PortfolioStats,
}

#[derive(Serialize)]
pub struct PracticeAndPortfolioResponse {
    pub coding: AnalysisRecord,
    pub portfolio: AnalysisRecord,
}

#[derive(Debug, Deserialize)]
pub struct ReadinessRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub target_role: String,
}

fn ttl(state: &AppState) -> Duration {
    Duration::days(state.config.analysis_ttl_days)
}

fn raw_stats<T: Serialize>(stats: &T) -> Result<serde_json::Value, AppError> {
    serde_json::to_value(stats).map_err(|e| AppError::Internal(e.into()))
}

/// POST /api/v1/analysis/resume
pub async fn handle_resume_analysis(
    State(state): State<AppState>,
    payload: Result<Json<ResumeRequest>, JsonRejection>,
) -> Result<Json<AnalysisRecord>, AppError> {
    let Json(req) = payload?;
    // Raw stats describe the submission without storing the résumé itself.
    let raw = json!({
        "target_role": &req.target_role,
        "characters": req.resume_text.chars().count(),
    });

    let record = run_analysis(
        state.store.as_ref(),
        &state.locks,
        req.user_id,
        AnalysisType::Resume,
        raw,
        ttl(&state),
        analyze_resume(&req.resume_text, &req.target_role, &state.insight),
    )
    .await?;
    Ok(Json(record))
}

/// POST /api/v1/analysis/coding
pub async fn handle_coding_analysis(
    State(state): State<AppState>,
    payload: Result<Json<CodingRequest>, JsonRejection>,
) -> Result<Json<AnalysisRecord>, AppError> {
    let Json(req) = payload?;
    let record = run_analysis(
        state.store.as_ref(),
        &state.locks,
        req.user_id,
        AnalysisType::Coding,
        raw_stats(&req.stats)?,
        ttl(&state),
        analyze_coding(&req.stats, &req.target_role, &state.insight),
    )
    .await?;
    Ok(Json(record))
}

/// POST /api/v1/analysis/portfolio
pub async fn handle_portfolio_analysis(
    State(state): State<AppState>,
    payload: Result<Json<PortfolioRequest>, JsonRejection>,
) -> Result<Json<AnalysisRecord>, AppError> {
    let Json(req) = payload?;
    let record = run_analysis(
        state.store.as_ref(),
        &state.locks,
        req.user_id,
        AnalysisType::Portfolio,
        raw_stats(&req.stats)?,
        ttl(&state),
        analyze_portfolio(&req.stats, &req.target_role, &state.insight),
    )
    .await?;
    Ok(Json(record))
}

/// POST /api/v1/analysis/practice-and-portfolio
///
/// Both analyses run concurrently, each under its own writer lock.
pub async fn handle_practice_and_portfolio(
    State(state): State<AppState>,
    payload: Result<Json<PracticeAndPortfolioRequest>, JsonRejection>,
) -> Result<Json<PracticeAndPortfolioResponse>, AppError> {
    let Json(req) = payload?;
    let coding_raw = raw_stats(&req.coding)?;
    let portfolio_raw = raw_stats(&req.portfolio)?;

    let (coding, portfolio) = tokio::join!(
        run_analysis(
            state.store.as_ref(),
            &state.locks,
            req.user_id,
            AnalysisType::Coding,
            coding_raw,
            ttl(&state),
            analyze_coding(&req.coding, &req.target_role, &state.insight),
        ),
        run_analysis(
            state.store.as_ref(),
            &state.locks,
            req.user_id,
            AnalysisType::Portfolio,
            portfolio_raw,
            ttl(&state),
            analyze_portfolio(&req.portfolio, &req.target_role, &state.insight),
        ),
    );

    Ok(Json(PracticeAndPortfolioResponse {
        coding: coding?,
        portfolio: portfolio?,
    }))
}

/// GET /api/v1/analysis/:type/latest
pub async fn handle_latest_analysis(
    State(state): State<AppState>,
    Path(analysis_type): Path<String>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<AnalysisRecord>, AppError> {
    let parsed = AnalysisType::parse(&analysis_type).ok_or_else(|| {
        AppError::Validation(format!(
            "Unknown analysis type '{analysis_type}'; expected coding, portfolio or resume"
        ))
    })?;

    let record = state
        .store
        .latest_completed(params.user_id, parsed)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "No completed {} analysis for user {}",
                parsed.as_str(),
                params.user_id
            ))
        })?;
    Ok(Json(record))
}

/// POST /api/v1/readiness
pub async fn handle_recalculate_readiness(
    State(state): State<AppState>,
    payload: Result<Json<ReadinessRequest>, JsonRejection>,
) -> Result<Json<ReadinessScore>, AppError> {
    let Json(req) = payload?;
    let snapshot = recalculate(state.store.as_ref(), req.user_id, &req.target_role).await?;
    Ok(Json(snapshot))
}

/// GET /api/v1/readiness
pub async fn handle_get_readiness(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<ReadinessScore>, AppError> {
    let snapshot = state
        .store
        .readiness(params.user_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("No readiness score for user {}", params.user_id))
        })?;
    Ok(Json(snapshot))
}
