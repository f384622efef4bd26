//! Router builder utilities for the sales routes

use crate::sales::handlers::{AppState, get_filter_options, get_transactions, health_check};
use axum::{Router, routing::get};

/// Build the sales routes
///
/// - GET /sales/transactions - Paginated, filtered, searched listing
/// - GET /sales/filter-options - Distinct values for the filter panel
pub fn build_sales_routes(state: AppState) -> Router {
    Router::new()
        .route("/sales/transactions", get(get_transactions))
        .route("/sales/filter-options", get(get_filter_options))
        .with_state(state)
}

/// Build health check routes
pub fn health_routes() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Mount `routes` under `base_path`
///
/// An empty or "/" base path mounts at the root.
pub fn mount(base_path: &str, routes: Router) -> Router {
    let base = base_path.trim_end_matches('/');
    if base.is_empty() {
        routes
    } else {
        Router::new().nest(base, routes)
    }
}
