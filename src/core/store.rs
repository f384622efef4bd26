//! Storage trait for the transaction collection

use crate::core::predicate::{Field, Predicate, SortOrder};
use crate::core::transaction::{SummaryAggregate, Transaction};
use anyhow::Result;
use async_trait::async_trait;

/// Read access to the transaction collection
///
/// Implementations translate the backend-neutral [`Predicate`] and
/// [`SortOrder`] into their own query language. The query path is read-only;
/// [`insert_many`](TransactionStore::insert_many) exists for importers and
/// test seeding.
///
/// Calls are expected to carry their own timeouts; the service layer does not
/// retry.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Fetch up to `limit` matching records in sort order, skipping `skip`
    ///
    /// Records with equal sort keys must come back in the same relative order
    /// on every call against unchanged data.
    async fn find_page(
        &self,
        predicate: &Predicate,
        sort: SortOrder,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Transaction>>;

    /// Count all matching records, ignoring pagination
    async fn count(&self, predicate: &Predicate) -> Result<u64>;

    /// Aggregate totals over all matching records
    async fn summarize(&self, predicate: &Predicate) -> Result<SummaryAggregate>;

    /// Distinct values of a string field across the whole collection
    ///
    /// List fields (tags) are flattened. Ordering is unspecified and empty
    /// strings may be included.
    async fn distinct_values(&self, field: Field) -> Result<Vec<String>>;

    /// Observed `(min, max)` age, or `None` when no record carries an age
    async fn age_bounds(&self) -> Result<Option<(u32, u32)>>;

    /// Append records to the collection
    async fn insert_many(&self, transactions: Vec<Transaction>) -> Result<()>;
}
