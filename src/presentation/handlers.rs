// HTTP request handlers
use crate::infrastructure::chunked_stream::stream_from_receiver;
use crate::infrastructure::http_response::{accepts_brotli, csv_download_response, json_response};
use crate::presentation::app_state::AppState;
use crate::presentation::error::AppError;
use crate::presentation::pages;
use crate::presentation::params::{overview_request, raw_data_request, QueryPairs};
use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::{Html, IntoResponse, Response},
};
use std::sync::Arc;

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

fn html_error(error: AppError) -> Response {
    (error.status, Html(pages::error_page(error.status, &error.message))).into_response()
}

fn respond(result: Result<Response, axum::http::StatusCode>) -> Response {
    match result {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Overview dashboard page
pub async fn overview_page(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    let settings = state.overview_service.settings();
    let request = match overview_request(&QueryPairs(pairs), settings) {
        Ok(request) => request,
        Err(e) => return html_error(e.into()),
    };

    match state.overview_service.get_overview(&request).await {
        Ok(overview) => Html(pages::overview_page(&overview, &request, settings)).into_response(),
        Err(e) => html_error(e.into()),
    }
}

/// Overview dashboard as JSON
pub async fn overview_json(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let request = overview_request(&QueryPairs(pairs), state.overview_service.settings())?;
    let overview = state.overview_service.get_overview(&request).await?;

    Ok(respond(json_response(&overview, accepts_brotli(&headers)).await))
}

/// Stream the overview dashboard (progressive loading)
pub async fn overview_stream(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let request = overview_request(&QueryPairs(pairs), state.overview_service.settings())?;
    let compress = accepts_brotli(&headers);

    let rx = state.streaming_service.stream_overview(request).await;
    Ok(stream_from_receiver(rx, compress).await.into_response())
}

/// Filtered raw data page
pub async fn raw_data_page(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    let request = match raw_data_request(&QueryPairs(pairs), &state.raw_data_settings) {
        Ok(request) => request,
        Err(e) => return html_error(e.into()),
    };

    match state.raw_data_service.view(&request).await {
        Ok(view) => Html(pages::raw_data_page(&view, &request, &state.raw_data_settings)).into_response(),
        Err(e) => html_error(e.into()),
    }
}

/// Filtered raw data as JSON
pub async fn raw_data_json(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let request = raw_data_request(&QueryPairs(pairs), &state.raw_data_settings)?;
    let view = state.raw_data_service.view(&request).await?;

    Ok(respond(json_response(&view, accepts_brotli(&headers)).await))
}

/// Filtered raw data as a CSV download
pub async fn raw_data_csv(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let pairs = QueryPairs(pairs);
    let request = raw_data_request(&pairs, &state.raw_data_settings)?;
    let export = state
        .raw_data_service
        .export_csv(&request, pairs.single("file_name"))
        .await?;

    Ok(respond(
        csv_download_response(&export.bytes, &export.file_name, accepts_brotli(&headers)).await,
    ))
}
