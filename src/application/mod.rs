// Application layer - Use cases over the sales repository
pub mod overview_service;
pub mod raw_data_service;
pub mod sales_repository;
pub mod streaming_service;
