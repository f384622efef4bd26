//! HTTP handlers for the sales endpoints
//!
//! Successful responses use the envelope `{ "success": true, "data": ... }`.
//! Failures are rendered by [`SalesError`]'s `IntoResponse` impl.

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;

use super::filter_options::FilterOptionsService;
use super::service::TransactionQueryService;
use crate::core::error::SalesError;
use crate::core::query::{TransactionQuery, TransactionQueryParams};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub transactions: Arc<TransactionQueryService>,
    pub filter_options: Arc<FilterOptionsService>,
    /// Page size applied when the request carries none (or an invalid one)
    pub default_page_size: u64,
}

/// Success envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// List transactions
///
/// GET /sales/transactions?search=..&sortBy=..&page=..&pageSize=..&regions=..
///
/// Multi-select parameters may be repeated. Malformed values are normalized
/// rather than rejected; only an undecodable query string is a 400.
pub async fn get_transactions(
    State(state): State<AppState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Response, SalesError> {
    let Query(pairs) = query?;
    let params = TransactionQueryParams::from_pairs(pairs);
    let query = TransactionQuery::from_params(&params, state.default_page_size);

    let page = state.transactions.get_transactions(&query).await?;

    Ok(Json(ApiResponse::ok(page.as_ref())).into_response())
}

/// GET /sales/filter-options
pub async fn get_filter_options(State(state): State<AppState>) -> Result<Response, SalesError> {
    let options = state.filter_options.get_filter_options().await?;

    Ok(Json(ApiResponse::ok(options.as_ref())).into_response())
}

/// Health check endpoint handler
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "OK",
        "message": "Server is running",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
