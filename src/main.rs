// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::sync::Arc;
use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::application::overview_service::OverviewService;
use crate::application::raw_data_service::RawDataService;
use crate::application::streaming_service::StreamingOverviewService;
use crate::infrastructure::config::load_config;
use crate::infrastructure::csv_export::CsvCache;
use crate::infrastructure::sales_api_repository::SalesApiRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    health_check, overview_json, overview_page, overview_stream, raw_data_csv, raw_data_json,
    raw_data_page,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (RUST_LOG controls the level)
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = load_config()?;

    // Create repository (infrastructure layer)
    let repository = Arc::new(SalesApiRepository::new(config.source.url.clone()));

    // Create services (application layer)
    let overview_service = OverviewService::new(repository.clone(), config.overview.clone());
    let streaming_service = StreamingOverviewService::new(overview_service.clone());
    let raw_data_service = RawDataService::new(
        repository.clone(),
        Arc::new(CsvCache::new(config.raw_data.csv_cache_capacity)),
        config.raw_data.default_file_name.clone(),
    );

    // Create application state
    let state = Arc::new(AppState {
        overview_service,
        streaming_service,
        raw_data_service,
        raw_data_settings: config.raw_data.clone(),
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/", get(overview_page))
        .route("/raw-data", get(raw_data_page))
        .route("/api/overview", get(overview_json))
        .route("/api/overview/stream", get(overview_stream))
        .route("/api/raw-data", get(raw_data_json))
        .route("/api/raw-data/csv", get(raw_data_csv))
        .route("/healthz", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!("Starting sales-dashboard on {}", listener.local_addr()?);

    axum::serve(listener, router).await?;

    Ok(())
}
