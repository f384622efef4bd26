//! In-memory implementation of TransactionStore for testing and development

use crate::core::predicate::{Field, FieldValue, Predicate, SortOrder};
use crate::core::store::TransactionStore;
use crate::core::transaction::{SummaryAggregate, Transaction};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, RwLock};

/// In-memory transaction store
///
/// Predicates are evaluated in process. The natural order of the collection
/// is insertion order and sorting is stable, so ties always come back in
/// insertion order. Uses RwLock for thread-safe access.
#[derive(Clone, Default)]
pub struct InMemoryTransactionStore {
    transactions: Arc<RwLock<Vec<Transaction>>>,
}

impl InMemoryTransactionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with records
    pub fn with_transactions(transactions: Vec<Transaction>) -> Self {
        Self {
            transactions: Arc::new(RwLock::new(transactions)),
        }
    }

    fn matching(&self, predicate: &Predicate) -> Result<Vec<Transaction>> {
        let transactions = self
            .transactions
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(transactions
            .iter()
            .filter(|tx| predicate.matches(tx))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl TransactionStore for InMemoryTransactionStore {
    async fn find_page(
        &self,
        predicate: &Predicate,
        sort: SortOrder,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Transaction>> {
        let mut matching = self.matching(predicate)?;
        matching.sort_by(|a, b| sort.compare(a, b));

        Ok(matching
            .into_iter()
            .skip(usize::try_from(skip).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .collect())
    }

    async fn count(&self, predicate: &Predicate) -> Result<u64> {
        let transactions = self
            .transactions
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(transactions.iter().filter(|tx| predicate.matches(tx)).count() as u64)
    }

    async fn summarize(&self, predicate: &Predicate) -> Result<SummaryAggregate> {
        let transactions = self
            .transactions
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(transactions
            .iter()
            .filter(|tx| predicate.matches(tx))
            .collect())
    }

    async fn distinct_values(&self, field: Field) -> Result<Vec<String>> {
        let transactions = self
            .transactions
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        let mut seen = HashSet::new();
        let mut values = Vec::new();
        let mut record = |value: &str| {
            if seen.insert(value.to_string()) {
                values.push(value.to_string());
            }
        };
        for tx in transactions.iter() {
            match field.value_of(tx) {
                FieldValue::Text(text) => record(text),
                FieldValue::List(items) => items.iter().for_each(|item| record(item)),
                _ => return Err(anyhow!("Field '{}' has no string values", field.as_str())),
            }
        }
        Ok(values)
    }

    async fn age_bounds(&self) -> Result<Option<(u32, u32)>> {
        let transactions = self
            .transactions
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(transactions
            .iter()
            .filter_map(|tx| tx.age)
            .fold(None, |bounds, age| match bounds {
                None => Some((age, age)),
                Some((min, max)) => Some((min.min(age), max.max(age))),
            }))
    }

    async fn insert_many(&self, transactions: Vec<Transaction>) -> Result<()> {
        let mut stored = self
            .transactions
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        stored.extend(transactions);

        Ok(())
    }
}
