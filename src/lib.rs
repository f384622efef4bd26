//! # Retail Sales
//!
//! REST backend for browsing retail sales transactions.
//!
//! ## Features
//!
//! - **Search**: case-insensitive substring match on customer name or phone number
//! - **Filters**: multi-select (region, gender, category, tags, payment method)
//!   plus age and date ranges, combined with AND
//! - **Sorting & Pagination**: date, quantity or customer name; 1-based pages
//! - **Summary Totals**: units sold, amount and discount over the whole match set
//! - **Caching**: TTL cache keyed by the normalized request, with a background sweeper
//! - **Pluggable Storage**: in-memory store, or MongoDB behind `mongodb_backend`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use retail_sales::prelude::*;
//!
//! let store = InMemoryTransactionStore::with_transactions(records);
//!
//! ServerBuilder::new()
//!     .with_store(store)
//!     .with_config(AppConfig::default())
//!     .serve()
//!     .await?;
//! ```

pub mod config;
pub mod core;
pub mod sales;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Domain ===
    pub use crate::core::{
        AgeRange, DateRange, FilterSpec, PageRequest, PaginationMeta, SortSpec, SummaryAggregate,
        Transaction, TransactionQuery, TransactionQueryParams,
    };

    // === Query Building ===
    pub use crate::core::{
        Predicate, SortOrder, build_filter_query, build_search_query, build_sort_object, combine,
    };

    // === Caching & Errors ===
    pub use crate::core::{Cache, CacheSweeper, SalesError};

    // === Services ===
    pub use crate::sales::{
        AppState, FilterOptions, FilterOptionsService, SalesCache, TransactionPage,
        TransactionQueryService,
    };

    // === Storage ===
    pub use crate::core::TransactionStore;
    pub use crate::storage::InMemoryTransactionStore;
    #[cfg(feature = "mongodb_backend")]
    pub use crate::storage::MongoTransactionStore;

    // === Server ===
    pub use crate::config::AppConfig;
    pub use crate::server::ServerBuilder;

    // === External ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
}
