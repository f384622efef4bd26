//! Query builder
//!
//! Pure transforms from normalized request state into a backend-neutral
//! [`Predicate`] and [`SortOrder`]:
//!
//! - [`build_filter_query`] turns a [`FilterSpec`] into AND-ed constraints
//! - [`build_search_query`] turns a search term into an OR of substring matches
//! - [`build_sort_object`] maps a [`SortSpec`] to a field and direction
//!
//! [`combine`] joins search and filter predicates with a logical AND.

use crate::core::filter::{FilterSpec, SortSpec};
use crate::core::predicate::{Bound, Clause, Condition, Field, Predicate, SortOrder};
use std::collections::BTreeSet;

/// Shape of a filterable field's constraint
enum RuleKind {
    /// Membership in a set of strings
    MultiSelect(fn(&FilterSpec) -> &BTreeSet<String>),
    /// Inclusive integer bounds
    IntegerRange(fn(&FilterSpec) -> (Option<i64>, Option<i64>)),
    /// Inclusive timestamp bounds
    TimestampRange(fn(&FilterSpec) -> (Option<Bound>, Option<Bound>)),
}

/// Declarative mapping from filter field to predicate construction
///
/// Adding a filterable field means adding a row here.
const FILTER_RULES: &[(Field, RuleKind)] = &[
    (Field::CustomerRegion, RuleKind::MultiSelect(regions)),
    (Field::Gender, RuleKind::MultiSelect(genders)),
    (Field::Age, RuleKind::IntegerRange(age_bounds)),
    (Field::ProductCategory, RuleKind::MultiSelect(categories)),
    (Field::Tags, RuleKind::MultiSelect(tags)),
    (Field::PaymentMethod, RuleKind::MultiSelect(payment_methods)),
    (Field::Date, RuleKind::TimestampRange(date_bounds)),
];

fn regions(filters: &FilterSpec) -> &BTreeSet<String> {
    &filters.regions
}

fn genders(filters: &FilterSpec) -> &BTreeSet<String> {
    &filters.genders
}

fn categories(filters: &FilterSpec) -> &BTreeSet<String> {
    &filters.categories
}

fn tags(filters: &FilterSpec) -> &BTreeSet<String> {
    &filters.tags
}

fn payment_methods(filters: &FilterSpec) -> &BTreeSet<String> {
    &filters.payment_methods
}

fn age_bounds(filters: &FilterSpec) -> (Option<i64>, Option<i64>) {
    filters.age_range.map_or((None, None), |range| {
        (range.min().map(i64::from), range.max().map(i64::from))
    })
}

fn date_bounds(filters: &FilterSpec) -> (Option<Bound>, Option<Bound>) {
    filters.date_range.map_or((None, None), |range| {
        (
            range.start().map(Bound::Timestamp),
            range.end().map(Bound::Timestamp),
        )
    })
}

fn push_range(predicate: &mut Predicate, field: Field, min: Option<Bound>, max: Option<Bound>) {
    if let Some(bound) = min {
        predicate.push(Clause::Where(Condition::AtLeast { field, bound }));
    }
    if let Some(bound) = max {
        predicate.push(Clause::Where(Condition::AtMost { field, bound }));
    }
}

/// Build the AND of all active filter constraints
///
/// Absent fields (empty sets, missing ranges, missing bounds) contribute no
/// constraint.
pub fn build_filter_query(filters: &FilterSpec) -> Predicate {
    let mut predicate = Predicate::match_all();

    for (field, kind) in FILTER_RULES {
        match kind {
            RuleKind::MultiSelect(values) => {
                let values = values(filters);
                if !values.is_empty() {
                    predicate.push(Clause::Where(Condition::In {
                        field: *field,
                        values: values.iter().cloned().collect(),
                    }));
                }
            }
            RuleKind::IntegerRange(bounds) => {
                let (min, max) = bounds(filters);
                push_range(
                    &mut predicate,
                    *field,
                    min.map(Bound::Integer),
                    max.map(Bound::Integer),
                );
            }
            RuleKind::TimestampRange(bounds) => {
                let (start, end) = bounds(filters);
                push_range(&mut predicate, *field, start, end);
            }
        }
    }

    predicate
}

/// Build the search constraint for a customer name / phone number term
///
/// Blank terms match everything. Otherwise the trimmed term must appear,
/// case-insensitively, anywhere in the customer name or the phone number.
pub fn build_search_query(term: &str) -> Predicate {
    let term = term.trim();
    let mut predicate = Predicate::match_all();
    if term.is_empty() {
        return predicate;
    }

    predicate.push(Clause::AnyOf(vec![
        Condition::ContainsIgnoreCase {
            field: Field::CustomerName,
            needle: term.to_string(),
        },
        Condition::ContainsIgnoreCase {
            field: Field::PhoneNumber,
            needle: term.to_string(),
        },
    ]));
    predicate
}

/// Map a sort specification to a field and direction
pub fn build_sort_object(sort: SortSpec) -> SortOrder {
    let field = match sort {
        SortSpec::DateDesc | SortSpec::DateAsc => Field::Date,
        SortSpec::QuantityDesc | SortSpec::QuantityAsc => Field::Quantity,
        SortSpec::CustomerNameAsc | SortSpec::CustomerNameDesc => Field::CustomerName,
    };
    SortOrder::new(field, sort.direction())
}

/// Combined query: search AND filters
pub fn combine(search: Predicate, filters: Predicate) -> Predicate {
    search.and(filters)
}
