mod analysis;
mod config;
mod db;
mod errors;
mod insight;
mod llm_client;
mod roles;
mod routes;
mod state;
mod store;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::locks::WriterLocks;
use crate::config::Config;
use crate::db::connect_and_migrate;
use crate::insight::{FallbackInsight, RemoteInsightProvider};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{AnalysisStore, MemoryAnalysisStore, PgAnalysisStore};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Readiness API v{}", env!("CARGO_PKG_VERSION"));

    let store: Arc<dyn AnalysisStore> = match &config.database_url {
        Some(url) => Arc::new(PgAnalysisStore::new(connect_and_migrate(url).await?)),
        None => {
            warn!("DATABASE_URL not set; analyses are kept in memory and lost on restart");
            Arc::new(MemoryAnalysisStore::new())
        }
    };

    let insight = match &config.insight_api_key {
        Some(key) => {
            let llm = LlmClient::new(key.clone(), config.insight_timeout)?;
            info!(
                "Insight provider: {} (timeout {}s)",
                llm_client::MODEL,
                config.insight_timeout.as_secs()
            );
            FallbackInsight::new(
                Arc::new(RemoteInsightProvider::new(llm)),
                config.insight_timeout,
            )
        }
        None => {
            info!("INSIGHT_API_KEY not set; scores use heuristics only");
            FallbackInsight::disabled()
        }
    };

    let state = AppState {
        store,
        insight,
        locks: WriterLocks::new(),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
