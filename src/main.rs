//! Bot Traffic Log Drain
//!
//! Receives Vercel log drain webhooks, keeps only requests made by known
//! LLM/web crawlers, and streams the normalized rows to BigQuery.
//!
//! # Architecture
//!
//! ```text
//! Vercel ──POST /api/v1/drain──▶ axum handler
//!                                   │  raw bytes + x-vercel-signature
//!                                   ▼
//!                               Ingestor
//!                 verify HMAC → parse NDJSON → classify → normalize
//!                                   │  batch of BotLogRow
//!                                   ▼
//!                          BigQuery insertAll
//! ```
//!
//! Every delivery is acknowledged with 200 OK regardless of outcome; all
//! failure reporting happens through logs.

mod config;
mod error;
mod handlers;
mod logic;
mod models;
mod sink;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use logic::pipeline::Ingestor;
use sink::{BigQuerySink, BotLogSink};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "botdrain=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    tracing::info!("Bot traffic log drain starting...");
    tracing::info!(
        "Destination table: {}.{}.{} (reporting timezone {})",
        config.gcp_project,
        config.dataset_id,
        config.table_id,
        config.timezone
    );

    // One sink and one ingestor for the process lifetime; both are stateless
    // per request and shared across concurrent deliveries.
    let bigquery: Arc<dyn BotLogSink> = Arc::new(BigQuerySink::new(&config));
    let ingestor = Arc::new(Ingestor::new(
        bigquery,
        config.drain_secret.clone(),
        config.timezone,
    ));

    let state = AppState {
        config: config.clone(),
        ingestor,
    };

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: config::Config,
    pub ingestor: Arc<Ingestor>,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::check))
        .route("/api/v1/drain", post(handlers::drain::ingest))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
