//! Distinct filter values for populating the filter panel

use super::{CachedValue, SalesCache};
use crate::core::error::{SalesError, StoreOperation};
use crate::core::predicate::Field;
use crate::core::store::TransactionStore;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Fixed cache key for filter options
pub const FILTER_OPTIONS_CACHE_KEY: &str = "filter-options";

/// Filter options only change on import, so they are cached longer
pub const FILTER_OPTIONS_TTL: Duration = Duration::from_secs(10 * 60);

/// Age range reported when no record carries an age
pub const DEFAULT_AGE_BOUNDS: AgeBounds = AgeBounds { min: 0, max: 100 };

/// Observed age range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AgeBounds {
    pub min: u32,
    pub max: u32,
}

/// Selectable values for every filter
///
/// String lists are distinct, non-empty and sorted ascending (case-sensitive).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub regions: Vec<String>,
    pub genders: Vec<String>,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub payment_methods: Vec<String>,
    pub age_range: AgeBounds,
}

#[derive(Clone)]
pub struct FilterOptionsService {
    store: Arc<dyn TransactionStore>,
    cache: Arc<SalesCache>,
    ttl: Duration,
}

impl FilterOptionsService {
    pub fn new(store: Arc<dyn TransactionStore>, cache: Arc<SalesCache>) -> Self {
        Self {
            store,
            cache,
            ttl: FILTER_OPTIONS_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Compute (or serve from cache) the filter options
    ///
    /// The five distinct-value lookups and the age range run concurrently.
    pub async fn get_filter_options(&self) -> Result<Arc<FilterOptions>, SalesError> {
        if let Some(CachedValue::FilterOptions(options)) = self.cache.get(FILTER_OPTIONS_CACHE_KEY)
        {
            tracing::debug!(prefix = FILTER_OPTIONS_CACHE_KEY, "Cache hit");
            return Ok(options);
        }
        tracing::debug!(prefix = FILTER_OPTIONS_CACHE_KEY, "Cache miss");

        let store = &self.store;
        let (regions, genders, categories, tags, payment_methods, ages) = tokio::try_join!(
            store.distinct_values(Field::CustomerRegion),
            store.distinct_values(Field::Gender),
            store.distinct_values(Field::ProductCategory),
            store.distinct_values(Field::Tags),
            store.distinct_values(Field::PaymentMethod),
            store.age_bounds(),
        )
        .map_err(|e| {
            tracing::error!(error = %e, "Filter options query failed");
            SalesError::store(StoreOperation::FilterOptions, e)
        })?;

        let options = Arc::new(FilterOptions {
            regions: sorted_distinct(regions),
            genders: sorted_distinct(genders),
            categories: sorted_distinct(categories),
            tags: sorted_distinct(tags),
            payment_methods: sorted_distinct(payment_methods),
            age_range: ages.map_or(DEFAULT_AGE_BOUNDS, |(min, max)| AgeBounds { min, max }),
        });

        self.cache.set(
            FILTER_OPTIONS_CACHE_KEY,
            CachedValue::FilterOptions(Arc::clone(&options)),
            self.ttl,
        );

        Ok(options)
    }

    /// Drop the cached options so the next call recomputes them
    ///
    /// Intended for importers; the query path never invalidates.
    pub fn invalidate(&self) -> bool {
        self.cache.delete(FILTER_OPTIONS_CACHE_KEY)
    }
}

fn sorted_distinct(mut values: Vec<String>) -> Vec<String> {
    values.retain(|v| !v.is_empty());
    values.sort();
    values.dedup();
    values
}
