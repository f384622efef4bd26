//! Backend-neutral query representation
//!
//! The query builder produces a [`Predicate`] and a [`SortOrder`]; every
//! storage backend either evaluates them in process
//! ([`Predicate::matches`], [`SortOrder::compare`]) or translates them into
//! its native query language.

use crate::core::filter::Direction;
use crate::core::transaction::Transaction;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;

/// Queryable transaction fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    CustomerName,
    PhoneNumber,
    Gender,
    Age,
    CustomerRegion,
    ProductCategory,
    Tags,
    PaymentMethod,
    Date,
    Quantity,
}

impl Field {
    /// Document field name as stored
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::CustomerName => "customerName",
            Field::PhoneNumber => "phoneNumber",
            Field::Gender => "gender",
            Field::Age => "age",
            Field::CustomerRegion => "customerRegion",
            Field::ProductCategory => "productCategory",
            Field::Tags => "tags",
            Field::PaymentMethod => "paymentMethod",
            Field::Date => "date",
            Field::Quantity => "quantity",
        }
    }

    /// Borrow this field's value out of a transaction
    pub fn value_of<'a>(&self, tx: &'a Transaction) -> FieldValue<'a> {
        match self {
            Field::CustomerName => FieldValue::Text(&tx.customer_name),
            Field::PhoneNumber => FieldValue::Text(&tx.phone_number),
            Field::Gender => FieldValue::Text(&tx.gender),
            Field::CustomerRegion => FieldValue::Text(&tx.customer_region),
            Field::ProductCategory => FieldValue::Text(&tx.product_category),
            Field::PaymentMethod => FieldValue::Text(&tx.payment_method),
            Field::Tags => FieldValue::List(&tx.tags),
            Field::Age => FieldValue::Integer(tx.age.map(i64::from)),
            Field::Quantity => FieldValue::Integer(Some(i64::from(tx.quantity))),
            Field::Date => FieldValue::Timestamp(tx.date),
        }
    }
}

/// A borrowed field value, typed by shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    List(&'a [String]),
    Integer(Option<i64>),
    Timestamp(DateTime<Utc>),
}

/// Comparable bound for range conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Integer(i64),
    Timestamp(DateTime<Utc>),
}

impl Bound {
    /// Compare a field value against this bound
    ///
    /// Returns `None` when the value is missing or of another shape; such
    /// records never satisfy a range condition.
    fn cmp_value(&self, value: FieldValue<'_>) -> Option<Ordering> {
        match (self, value) {
            (Bound::Integer(bound), FieldValue::Integer(Some(v))) => Some(v.cmp(bound)),
            (Bound::Timestamp(bound), FieldValue::Timestamp(v)) => Some(v.cmp(bound)),
            _ => None,
        }
    }
}

/// A single constraint on one field
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Value is a member of the set; for list fields, any element is
    In { field: Field, values: Vec<String> },
    /// Value `>=` bound
    AtLeast { field: Field, bound: Bound },
    /// Value `<=` bound
    AtMost { field: Field, bound: Bound },
    /// Case-insensitive substring match anywhere in the value
    ContainsIgnoreCase { field: Field, needle: String },
}

impl Condition {
    pub fn field(&self) -> Field {
        match self {
            Condition::In { field, .. }
            | Condition::AtLeast { field, .. }
            | Condition::AtMost { field, .. }
            | Condition::ContainsIgnoreCase { field, .. } => *field,
        }
    }

    pub fn matches(&self, tx: &Transaction) -> bool {
        let value = self.field().value_of(tx);
        match self {
            Condition::In { values, .. } => match value {
                FieldValue::Text(text) => values.iter().any(|v| v == text),
                FieldValue::List(items) => items.iter().any(|item| values.contains(item)),
                _ => false,
            },
            Condition::AtLeast { bound, .. } => bound.cmp_value(value).is_some_and(Ordering::is_ge),
            Condition::AtMost { bound, .. } => bound.cmp_value(value).is_some_and(Ordering::is_le),
            Condition::ContainsIgnoreCase { needle, .. } => match value {
                FieldValue::Text(text) => text.to_lowercase().contains(&needle.to_lowercase()),
                _ => false,
            },
        }
    }
}

/// One conjunct of a predicate
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    Where(Condition),
    /// Logical OR over the conditions
    AnyOf(Vec<Condition>),
}

impl Clause {
    pub fn matches(&self, tx: &Transaction) -> bool {
        match self {
            Clause::Where(condition) => condition.matches(tx),
            Clause::AnyOf(conditions) => conditions.iter().any(|c| c.matches(tx)),
        }
    }
}

/// Logical AND of clauses; an empty predicate matches every record
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Predicate {
    clauses: Vec<Clause>,
}

impl Predicate {
    pub fn match_all() -> Self {
        Self::default()
    }

    pub fn push(&mut self, clause: Clause) {
        self.clauses.push(clause);
    }

    /// Conjunction of two predicates
    pub fn and(mut self, other: Predicate) -> Self {
        self.clauses.extend(other.clauses);
        self
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn is_match_all(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn matches(&self, tx: &Transaction) -> bool {
        self.clauses.iter().all(|clause| clause.matches(tx))
    }
}

/// Ordering applied to a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub field: Field,
    pub direction: Direction,
}

impl SortOrder {
    pub fn new(field: Field, direction: Direction) -> Self {
        Self { field, direction }
    }

    /// Compare two transactions under this ordering
    ///
    /// Records with equal keys compare equal; callers that need a
    /// deterministic order among ties must use a stable sort.
    pub fn compare(&self, a: &Transaction, b: &Transaction) -> Ordering {
        let ordering = match (self.field.value_of(a), self.field.value_of(b)) {
            (FieldValue::Text(x), FieldValue::Text(y)) => x.cmp(y),
            (FieldValue::Integer(x), FieldValue::Integer(y)) => x.cmp(&y),
            (FieldValue::Timestamp(x), FieldValue::Timestamp(y)) => x.cmp(&y),
            (FieldValue::List(x), FieldValue::List(y)) => x.cmp(y),
            _ => Ordering::Equal,
        };

        match self.direction {
            Direction::Ascending => ordering,
            Direction::Descending => ordering.reverse(),
        }
    }
}
