//! hsurvey-web library - household income/expense survey service
//!
//! Records survey responses into a primary database (falling back to a CSV
//! file) and renders aggregate statistics and charts.

use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod loader;
pub mod report;
pub mod store;
pub mod submission;

pub use crate::error::{ApiError, ApiResult};
use crate::store::TieredStore;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Two-tier record store, opened once at startup
    pub store: Arc<TieredStore>,
}

impl AppState {
    pub fn new(store: Arc<TieredStore>) -> Self {
        Self { store }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    Router::new()
        .route("/", get(api::serve_form))
        .route("/submit", post(api::submit))
        .route("/success", get(api::success_page))
        .route("/export", get(api::export_data))
        .route("/analysis", get(api::analysis_page))
        .route("/analysis/summary.csv", get(api::summary_csv_download))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
