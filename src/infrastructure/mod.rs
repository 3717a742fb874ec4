// Infrastructure layer - External dependencies and adapters
pub mod chunked_stream;
pub mod config;
pub mod csv_export;
pub mod http_response;
pub mod sales_api_repository;
