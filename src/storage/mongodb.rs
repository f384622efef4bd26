//! MongoDB storage backend using the official MongoDB async driver.
//!
//! Provides `MongoTransactionStore`, a [`TransactionStore`] backed by a single
//! collection of transaction documents (by default `salestransactions`, the
//! collection the bulk importer writes to).
//!
//! # Feature flag
//!
//! This module is gated behind the `mongodb_backend` feature flag:
//! ```toml
//! [dependencies]
//! retail-sales = { version = "0.1", features = ["mongodb_backend"] }
//! ```
//!
//! # Query translation
//!
//! | Condition              | BSON                                        |
//! |------------------------|---------------------------------------------|
//! | `In`                   | `{ field: { $in: [..] } }`                  |
//! | `AtLeast` / `AtMost`   | `{ field: { $gte: v } }` / `{ $lte: v }`    |
//! | `ContainsIgnoreCase`   | `{ field: { $regex: escaped, $options: "i" } }` |
//! | `Clause::AnyOf`        | `{ $or: [..] }`                             |
//! | predicate              | `{ $and: [..] }` (or the single clause)     |
//!
//! Sorts append `_id: 1` so that ties are returned in a stable order.
//!
//! # Serialization strategy
//!
//! Documents are converted through `serde_json::Value`, like the rest of the
//! crate's (de)serialization. The `date` field is stored as a native BSON
//! datetime so that range queries compare instants rather than strings, and
//! the driver-assigned `_id` is dropped on read.

use crate::core::filter::Direction;
use crate::core::predicate::{Bound, Clause, Condition, Field, Predicate, SortOrder};
use crate::core::store::TransactionStore;
use crate::core::transaction::{SummaryAggregate, Transaction};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{self, Bson, Document, doc};
use mongodb::{Client, Collection, Database, IndexModel};

/// Collection the bulk importer populates
pub const DEFAULT_COLLECTION: &str = "salestransactions";

// ---------------------------------------------------------------------------
// Query translation
// ---------------------------------------------------------------------------

fn bound_to_bson(bound: &Bound) -> Bson {
    match bound {
        Bound::Integer(value) => Bson::Int64(*value),
        Bound::Timestamp(ts) => Bson::DateTime(bson::DateTime::from_millis(ts.timestamp_millis())),
    }
}

fn condition_to_document(condition: &Condition) -> Document {
    match condition {
        Condition::In { field, values } => doc! { field.as_str(): { "$in": values.clone() } },
        Condition::AtLeast { field, bound } => {
            doc! { field.as_str(): { "$gte": bound_to_bson(bound) } }
        }
        Condition::AtMost { field, bound } => {
            doc! { field.as_str(): { "$lte": bound_to_bson(bound) } }
        }
        Condition::ContainsIgnoreCase { field, needle } => doc! {
            field.as_str(): { "$regex": regex::escape(needle), "$options": "i" }
        },
    }
}

fn clause_to_document(clause: &Clause) -> Document {
    match clause {
        Clause::Where(condition) => condition_to_document(condition),
        Clause::AnyOf(conditions) => {
            let branches: Vec<Document> = conditions.iter().map(condition_to_document).collect();
            doc! { "$or": branches }
        }
    }
}

/// Translate a predicate into a MongoDB filter document
pub fn predicate_to_filter(predicate: &Predicate) -> Document {
    let mut clauses: Vec<Document> = predicate.clauses().iter().map(clause_to_document).collect();
    match clauses.len() {
        0 => Document::new(),
        1 => clauses.remove(0),
        _ => doc! { "$and": clauses },
    }
}

/// Translate a sort order into a MongoDB sort document with an `_id` tie-break
pub fn sort_to_document(sort: SortOrder) -> Document {
    let direction = match sort.direction {
        Direction::Ascending => 1,
        Direction::Descending => -1,
    };
    doc! { sort.field.as_str(): direction, "_id": 1 }
}

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------

/// Convert a transaction into a document, storing `date` as a BSON datetime.
fn transaction_to_document(tx: &Transaction) -> Result<Document> {
    let json =
        serde_json::to_value(tx).map_err(|e| anyhow!("Failed to serialize transaction: {}", e))?;
    let mut doc = match bson::to_bson(&json)
        .map_err(|e| anyhow!("Failed to convert JSON to BSON: {}", e))?
    {
        Bson::Document(d) => d,
        _ => return Err(anyhow!("Expected BSON document, got non-object")),
    };

    doc.insert(
        "date",
        Bson::DateTime(bson::DateTime::from_millis(tx.date.timestamp_millis())),
    );
    Ok(doc)
}

/// Convert a stored document back into a transaction.
fn document_to_transaction(mut doc: Document) -> Result<Transaction> {
    doc.remove("_id");

    if let Some(Bson::DateTime(date)) = doc.get("date") {
        let rfc3339 = date
            .try_to_rfc3339_string()
            .map_err(|e| anyhow!("Invalid transaction date: {}", e))?;
        doc.insert("date", Bson::String(rfc3339));
    }

    // Importers may write counts as doubles, and NaN for unparseable columns
    for key in ["age", "quantity"] {
        if let Some(Bson::Double(value)) = doc.get(key) {
            let count = if value.is_finite() && *value >= 0.0 {
                Bson::Int64(value.trunc() as i64)
            } else {
                Bson::Null
            };
            doc.insert(key, count);
        }
    }
    for key in ["pricePerUnit", "discountPercentage", "totalAmount", "finalAmount"] {
        if matches!(doc.get(key), Some(Bson::Double(value)) if !value.is_finite()) {
            doc.insert(key, Bson::Null);
        }
    }
    if matches!(doc.get("age"), Some(Bson::Int32(v)) if *v < 0)
        || matches!(doc.get("age"), Some(Bson::Int64(v)) if u32::try_from(*v).is_err())
    {
        doc.insert("age", Bson::Null);
    }

    let json = Bson::Document(doc).into_relaxed_extjson();
    serde_json::from_value(json)
        .map_err(|e| anyhow!("Failed to deserialize transaction from document: {}", e))
}

fn number(doc: &Document, key: &str) -> f64 {
    match doc.get(key) {
        Some(Bson::Int32(v)) => f64::from(*v),
        Some(Bson::Int64(v)) => *v as f64,
        Some(Bson::Double(v)) => *v,
        _ => 0.0,
    }
}

fn age_value(doc: &Document, key: &str) -> Option<u32> {
    match doc.get(key) {
        Some(Bson::Int32(v)) => u32::try_from(*v).ok(),
        Some(Bson::Int64(v)) => u32::try_from(*v).ok(),
        Some(Bson::Double(v)) if v.is_finite() && *v >= 0.0 => Some(*v as u32),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// MongoTransactionStore
// ---------------------------------------------------------------------------

/// Transaction store backed by a MongoDB collection.
///
/// # Example
///
/// ```rust,ignore
/// use retail_sales::storage::MongoTransactionStore;
///
/// let store = MongoTransactionStore::connect(
///     "mongodb://localhost:27017",
///     "retail_sales",
///     "salestransactions",
/// )
/// .await?;
/// store.ensure_indexes().await?;
/// ```
#[derive(Clone, Debug)]
pub struct MongoTransactionStore {
    collection: Collection<Document>,
}

impl MongoTransactionStore {
    /// Create a store over `collection` in the given database.
    pub fn new(database: &Database, collection: &str) -> Self {
        Self {
            collection: database.collection(collection),
        }
    }

    /// Connect to a MongoDB deployment and open the collection.
    pub async fn connect(uri: &str, database: &str, collection: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(|e| anyhow!("Failed to connect to MongoDB: {}", e))?;
        Ok(Self::new(&client.database(database), collection))
    }

    /// Get a reference to the underlying collection.
    pub fn collection(&self) -> &Collection<Document> {
        &self.collection
    }

    /// Create the indexes backing filters, search and sorts.
    ///
    /// Idempotent; safe to call on every startup.
    pub async fn ensure_indexes(&self) -> Result<()> {
        let indexes = [
            doc! { "transactionId": 1 },
            doc! { "date": -1 },
            doc! { "customerName": 1 },
            doc! { "phoneNumber": 1 },
            doc! { "gender": 1 },
            doc! { "age": 1 },
            doc! { "customerRegion": 1 },
            doc! { "productCategory": 1 },
            doc! { "tags": 1 },
            doc! { "quantity": -1 },
            doc! { "paymentMethod": 1 },
        ]
        .into_iter()
        .map(|keys| IndexModel::builder().keys(keys).build());

        self.collection
            .create_indexes(indexes)
            .await
            .map_err(|e| anyhow!("Failed to create indexes on transactions collection: {}", e))?;

        tracing::info!(
            collection = self.collection.name(),
            "Transaction indexes ensured"
        );
        Ok(())
    }
}

#[async_trait]
impl TransactionStore for MongoTransactionStore {
    async fn find_page(
        &self,
        predicate: &Predicate,
        sort: SortOrder,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Transaction>> {
        let limit = i64::try_from(limit).map_err(|_| anyhow!("Page size too large: {}", limit))?;

        let cursor = self
            .collection
            .find(predicate_to_filter(predicate))
            .sort(sort_to_document(sort))
            .skip(skip)
            .limit(limit)
            .await
            .map_err(|e| anyhow!("Failed to query transactions: {}", e))?;

        let docs: Vec<Document> = cursor
            .try_collect()
            .await
            .map_err(|e| anyhow!("Failed to collect transactions: {}", e))?;

        docs.into_iter().map(document_to_transaction).collect()
    }

    async fn count(&self, predicate: &Predicate) -> Result<u64> {
        self.collection
            .count_documents(predicate_to_filter(predicate))
            .await
            .map_err(|e| anyhow!("Failed to count transactions: {}", e))
    }

    async fn summarize(&self, predicate: &Predicate) -> Result<SummaryAggregate> {
        let pipeline = vec![
            doc! { "$match": predicate_to_filter(predicate) },
            doc! {
                "$group": {
                    "_id": Bson::Null,
                    "totalUnits": { "$sum": "$quantity" },
                    "totalAmount": { "$sum": "$totalAmount" },
                    "totalDiscount": { "$sum": { "$subtract": ["$totalAmount", "$finalAmount"] } },
                }
            },
        ];

        let groups: Vec<Document> = self
            .collection
            .aggregate(pipeline)
            .await
            .map_err(|e| anyhow!("Failed to aggregate transaction summary: {}", e))?
            .try_collect()
            .await
            .map_err(|e| anyhow!("Failed to collect transaction summary: {}", e))?;

        Ok(groups
            .first()
            .map(|group| SummaryAggregate {
                total_units_sold: number(group, "totalUnits").max(0.0) as u64,
                total_amount: number(group, "totalAmount"),
                total_discount: number(group, "totalDiscount"),
            })
            .unwrap_or_default())
    }

    async fn distinct_values(&self, field: Field) -> Result<Vec<String>> {
        let values = self
            .collection
            .distinct(field.as_str(), Document::new())
            .await
            .map_err(|e| anyhow!("Failed to list distinct {}: {}", field.as_str(), e))?;

        Ok(values
            .into_iter()
            .filter_map(|value| match value {
                Bson::String(s) => Some(s),
                _ => None,
            })
            .collect())
    }

    async fn age_bounds(&self) -> Result<Option<(u32, u32)>> {
        let pipeline = vec![doc! {
            "$group": {
                "_id": Bson::Null,
                "minAge": { "$min": "$age" },
                "maxAge": { "$max": "$age" },
            }
        }];

        let groups: Vec<Document> = self
            .collection
            .aggregate(pipeline)
            .await
            .map_err(|e| anyhow!("Failed to aggregate age range: {}", e))?
            .try_collect()
            .await
            .map_err(|e| anyhow!("Failed to collect age range: {}", e))?;

        Ok(groups.first().and_then(|group| {
            Some((age_value(group, "minAge")?, age_value(group, "maxAge")?))
        }))
    }

    async fn insert_many(&self, transactions: Vec<Transaction>) -> Result<()> {
        if transactions.is_empty() {
            return Ok(());
        }

        let docs = transactions
            .iter()
            .map(transaction_to_document)
            .collect::<Result<Vec<_>>>()?;

        self.collection
            .insert_many(docs)
            .await
            .map_err(|e| anyhow!("Failed to insert transactions: {}", e))?;

        Ok(())
    }
}
