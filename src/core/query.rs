//! Query parameters, normalization and pagination utilities
//!
//! All default-value policy lives in [`TransactionQuery::from_params`]:
//! downstream components only ever see fully normalized input.

use crate::core::filter::{AgeRange, DateRange, FilterSpec, SortSpec};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;

/// Page number used when none (or an invalid one) is supplied
pub const DEFAULT_PAGE: u64 = 1;

/// Page size used when none (or an invalid one) is supplied
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Raw query string parameters for the transaction listing
///
/// Every value is kept as received; multi-select keys may repeat.
///
/// # Example
/// ```text
/// GET /sales/transactions?search=neha&sortBy=quantity-desc&page=2&pageSize=20
///     &regions=North&regions=East&ageMin=25&dateStart=2023-01-01
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionQueryParams {
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub regions: Vec<String>,
    pub genders: Vec<String>,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub payment_methods: Vec<String>,
    pub age_min: Option<String>,
    pub age_max: Option<String>,
    pub date_start: Option<String>,
    pub date_end: Option<String>,
}

impl TransactionQueryParams {
    /// Collect parameters from decoded `key=value` pairs
    ///
    /// Repeated multi-select keys accumulate; for scalar keys the last value
    /// wins. Unknown keys are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            let value = value.into();
            match key.as_ref() {
                "search" => params.search = Some(value),
                "sortBy" => params.sort_by = Some(value),
                "page" => params.page = Some(value),
                "pageSize" => params.page_size = Some(value),
                "regions" => params.regions.push(value),
                "genders" => params.genders.push(value),
                "categories" => params.categories.push(value),
                "tags" => params.tags.push(value),
                "paymentMethods" => params.payment_methods.push(value),
                "ageMin" => params.age_min = Some(value),
                "ageMax" => params.age_max = Some(value),
                "dateStart" => params.date_start = Some(value),
                "dateEnd" => params.date_end = Some(value),
                _ => {}
            }
        }
        params
    }
}

/// 1-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    page: u64,
    page_size: u64,
}

impl PageRequest {
    /// Values below 1 are raised to 1
    pub fn new(page: u64, page_size: u64) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Number of records preceding this page
    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE, DEFAULT_PAGE_SIZE)
    }
}

/// Fully normalized transaction listing request
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransactionQuery {
    /// Trimmed search term; empty means no search constraint
    pub search: String,
    pub filters: FilterSpec,
    pub sort: SortSpec,
    pub page: PageRequest,
}

impl TransactionQuery {
    pub fn new(search: &str, filters: FilterSpec, sort: SortSpec, page: PageRequest) -> Self {
        Self {
            search: search.trim().to_string(),
            filters,
            sort,
            page,
        }
    }

    /// Apply the default-value policy to raw parameters
    ///
    /// - blank search → no search
    /// - unknown `sortBy` → `date-desc`
    /// - unparsable or non-positive `page`/`pageSize` → defaults
    /// - blank multi-select values are dropped; duplicates collapse
    /// - unparsable age or date bounds are treated as absent
    pub fn from_params(params: &TransactionQueryParams, default_page_size: u64) -> Self {
        let page = coerce_positive("page", params.page.as_deref()).unwrap_or(DEFAULT_PAGE);
        let page_size = coerce_positive("pageSize", params.page_size.as_deref())
            .unwrap_or(default_page_size);

        let filters = FilterSpec {
            regions: value_set(&params.regions),
            genders: value_set(&params.genders),
            categories: value_set(&params.categories),
            tags: value_set(&params.tags),
            payment_methods: value_set(&params.payment_methods),
            age_range: AgeRange::new(
                parse_age("ageMin", params.age_min.as_deref()),
                parse_age("ageMax", params.age_max.as_deref()),
            ),
            date_range: DateRange::new(
                parse_bound("dateStart", params.date_start.as_deref()),
                parse_bound("dateEnd", params.date_end.as_deref()),
            ),
        };

        Self::new(
            params.search.as_deref().unwrap_or_default(),
            filters,
            params
                .sort_by
                .as_deref()
                .map(SortSpec::from_token)
                .unwrap_or_default(),
            PageRequest::new(page, page_size),
        )
    }
}

fn value_set(values: &[String]) -> BTreeSet<String> {
    values
        .iter()
        .filter(|v| !v.trim().is_empty())
        .cloned()
        .collect()
}

/// Integer coercion accepting a leading integer prefix (`"2.5"` → 2)
fn parse_leading_integer(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    let digits_start = usize::from(raw.starts_with(['-', '+']));
    let digits_len = raw[digits_start..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits_len == 0 {
        return None;
    }
    raw[..digits_start + digits_len].parse().ok()
}

fn coerce_positive(name: &str, raw: Option<&str>) -> Option<u64> {
    let raw = raw.filter(|r| !r.trim().is_empty())?;
    match parse_leading_integer(raw) {
        Some(value) if value >= 1 => Some(value as u64),
        _ => {
            tracing::warn!(param = name, value = raw, "Ignoring invalid numeric parameter");
            None
        }
    }
}

fn parse_age(name: &str, raw: Option<&str>) -> Option<u32> {
    let raw = raw.filter(|r| !r.trim().is_empty())?;
    let parsed = parse_leading_integer(raw).and_then(|v| u32::try_from(v).ok());
    if parsed.is_none() {
        tracing::warn!(param = name, value = raw, "Ignoring invalid age bound");
    }
    parsed
}

/// Parse a date bound
///
/// Accepts RFC 3339 timestamps, `YYYY-MM-DDTHH:MM:SS[.fff]` (UTC) and plain
/// `YYYY-MM-DD` dates (UTC midnight).
pub fn parse_date_bound(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn parse_bound(name: &str, raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw.filter(|r| !r.trim().is_empty())?;
    let parsed = parse_date_bound(raw);
    if parsed.is_none() {
        tracing::warn!(param = name, value = raw, "Ignoring unparsable date bound");
    }
    parsed
}

/// Pagination metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    /// Current page number (starts at 1)
    pub current_page: u64,

    /// Number of items per page
    pub page_size: u64,

    /// Total number of matching items, ignoring pagination
    pub total_count: u64,

    /// `ceil(total_count / page_size)`; 0 when nothing matches
    pub total_pages: u64,
}

impl PaginationMeta {
    pub fn new(page: PageRequest, total_count: u64) -> Self {
        Self {
            current_page: page.page(),
            page_size: page.page_size(),
            total_count,
            total_pages: total_count.div_ceil(page.page_size()),
        }
    }
}
