// Presentation layer - HTTP handlers, query parsing and HTML rendering
pub mod app_state;
pub mod charts;
pub mod error;
pub mod handlers;
pub mod pages;
pub mod params;
