//! Sales transaction record and derived aggregates

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Read an explicit `null` as the field's default
///
/// The bulk importer writes `null` for blank columns rather than omitting them.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One retail sale event
///
/// Field names are serialized in camelCase so that documents written by the
/// bulk importer deserialize without any mapping layer. Records are only ever
/// read by the query path. Explicit `null`s read as the field default; a
/// record with a `null` date sorts as the Unix epoch.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Transaction {
    /// Unique, immutable identifier assigned at import time
    #[serde(deserialize_with = "null_as_default")]
    pub transaction_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub date: DateTime<Utc>,

    #[serde(deserialize_with = "null_as_default")]
    pub customer_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub customer_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub phone_number: String,
    #[serde(deserialize_with = "null_as_default")]
    pub gender: String,
    pub age: Option<u32>,
    #[serde(deserialize_with = "null_as_default")]
    pub customer_region: String,
    #[serde(deserialize_with = "null_as_default")]
    pub customer_type: String,

    #[serde(deserialize_with = "null_as_default")]
    pub product_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub product_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub brand: String,
    #[serde(deserialize_with = "null_as_default")]
    pub product_category: String,
    /// Unordered, possibly empty
    #[serde(deserialize_with = "null_as_default")]
    pub tags: Vec<String>,

    #[serde(deserialize_with = "null_as_default")]
    pub quantity: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub price_per_unit: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub discount_percentage: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub total_amount: f64,
    /// Amount after discount
    #[serde(deserialize_with = "null_as_default")]
    pub final_amount: f64,

    #[serde(deserialize_with = "null_as_default")]
    pub payment_method: String,
    #[serde(deserialize_with = "null_as_default")]
    pub order_status: String,
    #[serde(deserialize_with = "null_as_default")]
    pub delivery_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub store_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub store_location: String,
    #[serde(deserialize_with = "null_as_default")]
    pub salesperson_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub employee_name: String,
}

impl Transaction {
    /// Discount granted on this sale (`totalAmount - finalAmount`)
    pub fn discount(&self) -> f64 {
        self.total_amount - self.final_amount
    }
}

/// Totals over the full filtered and searched record set
///
/// Computed independently of pagination, so the numbers are the same for
/// every page of a given query.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryAggregate {
    /// Sum of `quantity`
    pub total_units_sold: u64,
    /// Sum of `totalAmount`
    pub total_amount: f64,
    /// Sum of `totalAmount - finalAmount`
    pub total_discount: f64,
}

impl SummaryAggregate {
    /// Fold one more transaction into the running totals
    pub fn accumulate(&mut self, transaction: &Transaction) {
        self.total_units_sold += u64::from(transaction.quantity);
        self.total_amount += transaction.total_amount;
        self.total_discount += transaction.discount();
    }
}

impl<'a> FromIterator<&'a Transaction> for SummaryAggregate {
    fn from_iter<I: IntoIterator<Item = &'a Transaction>>(iter: I) -> Self {
        let mut summary = Self::default();
        for transaction in iter {
            summary.accumulate(transaction);
        }
        summary
    }
}
