//! Sales transaction browsing: query services and HTTP handlers
//!
//! Both services share one explicitly constructed [`SalesCache`], injected at
//! construction time. Tests build a fresh cache per case.

pub mod filter_options;
pub mod handlers;
pub mod service;

pub use filter_options::{AgeBounds, FilterOptions, FilterOptionsService};
pub use handlers::{AppState, get_filter_options, get_transactions, health_check};
pub use service::{TransactionPage, TransactionQueryService};

use crate::core::cache::Cache;
use std::sync::Arc;

/// Values stored in the shared sales cache
#[derive(Debug, Clone)]
pub enum CachedValue {
    Transactions(Arc<TransactionPage>),
    FilterOptions(Arc<FilterOptions>),
}

/// Cache shared by the sales services
pub type SalesCache = Cache<CachedValue>;
