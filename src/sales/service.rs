//! Transaction query service
//!
//! Orchestrates one listing request:
//!
//! 1. derive the cache key from the normalized query
//! 2. return the cached page verbatim on a hit
//! 3. otherwise build the combined predicate and sort, then fetch the page,
//!    the total count and the summary concurrently
//! 4. cache the assembled result for the configured TTL
//!
//! The page, the count and the summary are all computed over the same
//! predicate (filters AND search), so summing any column across every page
//! reproduces the summary.

use super::{CachedValue, SalesCache};
use crate::core::builder::{build_filter_query, build_search_query, build_sort_object, combine};
use crate::core::cache::Cache;
use crate::core::error::{SalesError, StoreOperation};
use crate::core::filter::FilterSpec;
use crate::core::query::{PaginationMeta, TransactionQuery};
use crate::core::store::TransactionStore;
use crate::core::transaction::{SummaryAggregate, Transaction};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Cache key prefix for listing results
pub const TRANSACTIONS_CACHE_PREFIX: &str = "transactions";

/// How long a listing result is served from cache
pub const TRANSACTIONS_TTL: Duration = Duration::from_secs(2 * 60);

/// One page of transactions with pagination metadata and summary totals
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionPage {
    pub transactions: Vec<Transaction>,
    pub pagination: PaginationMeta,
    pub summary: SummaryAggregate,
}

/// Logical request parameters that identify a cached listing
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TransactionCacheKey<'a> {
    search: &'a str,
    filters: &'a FilterSpec,
    sort_by: &'static str,
    page: u64,
    page_size: u64,
}

/// Service answering paginated, filtered and searched listing requests
#[derive(Clone)]
pub struct TransactionQueryService {
    store: Arc<dyn TransactionStore>,
    cache: Arc<SalesCache>,
    ttl: Duration,
}

impl TransactionQueryService {
    pub fn new(store: Arc<dyn TransactionStore>, cache: Arc<SalesCache>) -> Self {
        Self {
            store,
            cache,
            ttl: TRANSACTIONS_TTL,
        }
    }

    /// Override the cache TTL for listing results
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Cache key for a normalized query
    pub fn cache_key(query: &TransactionQuery) -> Result<String, SalesError> {
        let key = TransactionCacheKey {
            search: &query.search,
            filters: &query.filters,
            sort_by: query.sort.token(),
            page: query.page.page(),
            page_size: query.page.page_size(),
        };
        Ok(Cache::<CachedValue>::generate_key(
            TRANSACTIONS_CACHE_PREFIX,
            &key,
        )?)
    }

    /// Fetch one page of transactions plus totals
    ///
    /// A cached result is returned as-is without checking the store; it may be
    /// up to one TTL stale. Any store failure fails the whole request and
    /// nothing is cached.
    pub async fn get_transactions(
        &self,
        query: &TransactionQuery,
    ) -> Result<Arc<TransactionPage>, SalesError> {
        let cache_key = Self::cache_key(query)?;

        if let Some(CachedValue::Transactions(page)) = self.cache.get(&cache_key) {
            tracing::debug!(prefix = TRANSACTIONS_CACHE_PREFIX, "Cache hit");
            return Ok(page);
        }
        tracing::debug!(prefix = TRANSACTIONS_CACHE_PREFIX, "Cache miss");

        let search_query = build_search_query(&query.search);
        let filter_query = build_filter_query(&query.filters);
        let predicate = combine(search_query, filter_query);
        let sort = build_sort_object(query.sort);

        let (transactions, total_count, summary) = tokio::try_join!(
            self.store
                .find_page(&predicate, sort, query.page.skip(), query.page.page_size()),
            self.store.count(&predicate),
            self.store.summarize(&predicate),
        )
        .map_err(|e| {
            tracing::error!(error = %e, "Transaction query failed");
            SalesError::store(StoreOperation::Transactions, e)
        })?;

        let page = Arc::new(TransactionPage {
            transactions,
            pagination: PaginationMeta::new(query.page, total_count),
            summary,
        });

        self.cache.set(
            cache_key,
            CachedValue::Transactions(Arc::clone(&page)),
            self.ttl,
        );

        Ok(page)
    }
}
