pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Analyses
        .route(
            "/api/v1/analysis/resume",
            post(handlers::handle_resume_analysis),
        )
        .route(
            "/api/v1/analysis/coding",
            post(handlers::handle_coding_analysis),
        )
        .route(
            "/api/v1/analysis/portfolio",
            post(handlers::handle_portfolio_analysis),
        )
        .route(
            "/api/v1/analysis/practice-and-portfolio",
            post(handlers::handle_practice_and_portfolio),
        )
        .route(
            "/api/v1/analysis/:type/latest",
            get(handlers::handle_latest_analysis),
        )
        // Readiness
        .route(
            "/api/v1/readiness",
            get(handlers::handle_get_readiness).post(handlers::handle_recalculate_readiness),
        )
        .with_state(state)
}
