// HTTP error type shared by the JSON and HTML handlers
use crate::infrastructure::csv_export::CsvEncodeError;
use crate::presentation::params::ParamError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

/// Renders as a JSON `{"error": "..."}` response with the matching status.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }

    pub fn bad_gateway(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: msg.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<ParamError> for AppError {
    fn from(e: ParamError) -> Self {
        AppError::bad_request(e.to_string())
    }
}

/// Service errors come from the upstream sales source or its payload, except
/// local CSV encoding failures.
impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        if e.downcast_ref::<CsvEncodeError>().is_some() {
            tracing::error!("CSV export error: {:#}", e);
            return AppError::internal(format!("{:#}", e));
        }
        tracing::error!("Sales source error: {:#}", e);
        AppError::bad_gateway(format!("{:#}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let param: AppError = ParamError::UnknownRegion("Atlantida".to_string()).into();
        assert_eq!(param.status, StatusCode::BAD_REQUEST);
        assert_eq!(param.message, "unknown region: Atlantida");

        let source: AppError = anyhow::anyhow!("connection refused")
            .context("Failed to fetch sales")
            .into();
        assert_eq!(source.status, StatusCode::BAD_GATEWAY);
        assert_eq!(source.message, "Failed to fetch sales: connection refused");
    }

    #[test]
    fn test_csv_encoding_failure_is_internal() {
        let error = anyhow::Error::new(CsvEncodeError::Flush("disk full".to_string()))
            .context("Failed to export CSV");
        let app: AppError = error.into();
        assert_eq!(app.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(app.message, "Failed to export CSV: Failed to flush CSV writer: disk full");
    }

    #[test]
    fn test_into_response_status() {
        let response = AppError::bad_request("nope").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
