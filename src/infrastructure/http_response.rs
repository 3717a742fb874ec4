// HTTP response utilities for JSON and CSV bodies with optional Brotli encoding
use async_compression::tokio::bufread::BrotliEncoder;
use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderValue, Response, StatusCode},
};
use serde::Serialize;
use tokio::io::AsyncReadExt;

/// Whether the client advertises Brotli in `Accept-Encoding`
pub fn accepts_brotli(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT_ENCODING)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.split(',').any(|enc| enc.trim().starts_with("br")))
        .unwrap_or(false)
}

pub async fn brotli_compress(bytes: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = BrotliEncoder::new(bytes);
    let mut compressed = Vec::new();
    encoder.read_to_end(&mut compressed).await?;
    Ok(compressed)
}

/// Build a response, compressing the body with Brotli when requested
pub async fn encoded_response(
    body: Vec<u8>,
    content_type: &'static str,
    compress: bool,
    headers: Vec<(header::HeaderName, HeaderValue)>,
) -> Result<Response<Body>, StatusCode> {
    let (body_bytes, content_encoding) = if compress {
        let compressed = brotli_compress(&body).await.map_err(|e| {
            tracing::error!("Brotli compression error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
        tracing::debug!(
            "Compressed: {} -> {} bytes ({:.1}% reduction)",
            body.len(),
            compressed.len(),
            (1.0 - compressed.len() as f64 / body.len().max(1) as f64) * 100.0
        );
        (compressed, Some("br"))
    } else {
        (body, None)
    };

    let mut response_builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, body_bytes.len());

    if let Some(encoding) = content_encoding {
        response_builder = response_builder.header(header::CONTENT_ENCODING, encoding);
    }
    for (name, value) in headers {
        response_builder = response_builder.header(name, value);
    }

    response_builder.body(Body::from(body_bytes)).map_err(|e| {
        tracing::error!("Response build error: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

pub async fn json_response<T: Serialize>(
    data: &T,
    compress: bool,
) -> Result<Response<Body>, StatusCode> {
    let body = serde_json::to_vec(data).map_err(|e| {
        tracing::error!("JSON serialization error: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    encoded_response(body, "application/json", compress, Vec::new()).await
}

/// CSV file download under `file_name`
pub async fn csv_download_response(
    bytes: &[u8],
    file_name: &str,
    compress: bool,
) -> Result<Response<Body>, StatusCode> {
    let disposition = format!(
        "attachment; filename=\"{}\"",
        file_name.replace(['"', '\\', '\r', '\n'], "_")
    );
    let disposition = HeaderValue::from_str(&disposition).map_err(|e| {
        tracing::error!("Invalid download file name {:?}: {}", file_name, e);
        StatusCode::BAD_REQUEST
    })?;

    encoded_response(
        bytes.to_vec(),
        "text/csv; charset=utf-8",
        compress,
        vec![(header::CONTENT_DISPOSITION, disposition)],
    )
    .await
}
