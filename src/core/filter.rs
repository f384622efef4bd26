//! Request-scoped filter and sort specifications

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Structured constraint set narrowing which transactions qualify
///
/// Multi-select fields are ordered sets: an empty set means "no constraint",
/// never "match nothing". Because the sets are ordered, two specs selecting
/// the same values in a different order are equal and serialize identically.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterSpec {
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub regions: BTreeSet<String>,

    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub genders: BTreeSet<String>,

    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub categories: BTreeSet<String>,

    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,

    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub payment_methods: BTreeSet<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_range: Option<AgeRange>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
}

impl FilterSpec {
    /// Whether no constraint at all is active
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
            && self.genders.is_empty()
            && self.categories.is_empty()
            && self.tags.is_empty()
            && self.payment_methods.is_empty()
            && self.age_range.is_none()
            && self.date_range.is_none()
    }
}

/// Inclusive age bounds, at least one of which is present
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    min: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max: Option<u32>,
}

impl AgeRange {
    /// Returns `None` when both bounds are absent
    pub fn new(min: Option<u32>, max: Option<u32>) -> Option<Self> {
        if min.is_none() && max.is_none() {
            return None;
        }
        Some(Self { min, max })
    }

    pub fn min(&self) -> Option<u32> {
        self.min
    }

    pub fn max(&self) -> Option<u32> {
        self.max
    }
}

/// Inclusive timestamp bounds, at least one of which is present
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    start: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end: Option<DateTime<Utc>>,
}

impl DateRange {
    /// Returns `None` when both bounds are absent
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Option<Self> {
        if start.is_none() && end.is_none() {
            return None;
        }
        Some(Self { start, end })
    }

    pub fn start(&self) -> Option<DateTime<Utc>> {
        self.start
    }

    pub fn end(&self) -> Option<DateTime<Utc>> {
        self.end
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Supported orderings for the transaction listing
///
/// Parsed from the `sortBy` query token. Unrecognized or missing tokens fall
/// back to [`SortSpec::DateDesc`] (newest first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortSpec {
    #[default]
    DateDesc,
    DateAsc,
    QuantityDesc,
    QuantityAsc,
    CustomerNameAsc,
    CustomerNameDesc,
}

impl SortSpec {
    pub const ALL: [SortSpec; 6] = [
        SortSpec::DateDesc,
        SortSpec::DateAsc,
        SortSpec::QuantityDesc,
        SortSpec::QuantityAsc,
        SortSpec::CustomerNameAsc,
        SortSpec::CustomerNameDesc,
    ];

    /// Parse a `sortBy` token, falling back to the default ordering
    pub fn from_token(token: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|spec| spec.token() == token.trim())
            .unwrap_or_default()
    }

    /// Wire token for this ordering
    pub fn token(&self) -> &'static str {
        match self {
            SortSpec::DateDesc => "date-desc",
            SortSpec::DateAsc => "date-asc",
            SortSpec::QuantityDesc => "quantity-desc",
            SortSpec::QuantityAsc => "quantity-asc",
            SortSpec::CustomerNameAsc => "customerName-asc",
            SortSpec::CustomerNameDesc => "customerName-desc",
        }
    }

    pub fn direction(&self) -> Direction {
        match self {
            SortSpec::DateAsc | SortSpec::QuantityAsc | SortSpec::CustomerNameAsc => {
                Direction::Ascending
            }
            SortSpec::DateDesc | SortSpec::QuantityDesc | SortSpec::CustomerNameDesc => {
                Direction::Descending
            }
        }
    }
}
