//! Core module containing the domain model, query building and caching

pub mod builder;
pub mod cache;
pub mod error;
pub mod filter;
pub mod predicate;
pub mod query;
pub mod store;
pub mod transaction;

pub use builder::{build_filter_query, build_search_query, build_sort_object, combine};
pub use cache::{Cache, CacheEntry, CacheSweeper};
pub use error::{SalesError, StoreOperation};
pub use filter::{AgeRange, DateRange, Direction, FilterSpec, SortSpec};
pub use predicate::{Bound, Clause, Condition, Field, FieldValue, Predicate, SortOrder};
pub use query::{PageRequest, PaginationMeta, TransactionQuery, TransactionQueryParams};
pub use store::TransactionStore;
pub use transaction::{SummaryAggregate, Transaction};
