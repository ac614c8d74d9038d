//! Builds a standardized attribute catalogue from a wide spreadsheet: one output
//! row per source column, with an inferred data type and fixed descriptive
//! fields, exported as a two-header-row workbook.

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod routes;
pub mod services;

pub use error::AppError;
pub use services::catalog::{build, classify, export};

// Application state
#[derive(Clone)]
pub struct AppState {
    pub config: config::Config,
}

impl AppState {
    pub fn new(config: config::Config) -> Self {
        Self { config }
    }
}

pub fn app(state: Arc<AppState>) -> Router {
    let max_file_size = state.config.max_file_size;
    Router::new()
        .merge(routes::routes())
        .merge(routes::attributes::routes(max_file_size))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
