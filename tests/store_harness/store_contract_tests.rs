//! Macro-generated test suite for `TransactionStore` contract validation.
//!
//! The `transaction_store_tests!` macro generates a test module that validates
//! any `TransactionStore` implementation against the predicates produced by
//! the query builder: search, every filter dimension, sorting, paging,
//! summaries and distinct values.
//!
//! # Usage
//!
//! ```rust,ignore
//! #[macro_use]
//! mod store_harness;
//!
//! use store_harness::*;
//! use retail_sales::storage::InMemoryTransactionStore;
//!
//! transaction_store_tests!(InMemoryTransactionStore::new());
//! ```

/// Generate a full `TransactionStore` conformance test suite.
///
/// `$factory` must be an expression that evaluates to an EMPTY store. It is
/// re-evaluated for each test; each test seeds it with
/// `sample_transactions()`.
#[macro_export]
macro_rules! transaction_store_tests {
    ($factory:expr) => {
        mod transaction_store_contract_tests {
            use super::*;
            use retail_sales::core::builder::{
                build_filter_query, build_search_query, build_sort_object, combine,
            };
            use retail_sales::core::filter::{AgeRange, DateRange, FilterSpec, SortSpec};
            use retail_sales::core::predicate::{Field, Predicate};
            use retail_sales::core::query::parse_date_bound;
            use retail_sales::core::store::TransactionStore;

            async fn seeded() -> impl TransactionStore {
                let store = $factory;
                store
                    .insert_many(sample_transactions())
                    .await
                    .expect("seeding should succeed");
                store
            }

            async fn matching_ids(
                store: &impl TransactionStore,
                predicate: &Predicate,
            ) -> std::collections::BTreeSet<String> {
                let page = store
                    .find_page(predicate, build_sort_object(SortSpec::DateDesc), 0, 100)
                    .await
                    .unwrap();
                id_set(&page)
            }

            // ==================================================================
            // Empty store
            // ==================================================================

            #[tokio::test]
            async fn test_empty_store() {
                let store = $factory;
                let all = Predicate::match_all();

                assert_eq!(store.count(&all).await.unwrap(), 0);
                assert!(
                    store
                        .find_page(&all, build_sort_object(SortSpec::DateDesc), 0, 10)
                        .await
                        .unwrap()
                        .is_empty()
                );
                let summary = store.summarize(&all).await.unwrap();
                assert_eq!(summary.total_units_sold, 0);
                assert_close(summary.total_amount, 0.0);
                assert!(
                    store
                        .distinct_values(Field::CustomerRegion)
                        .await
                        .unwrap()
                        .is_empty()
                );
                assert_eq!(store.age_bounds().await.unwrap(), None);
            }

            // ==================================================================
            // Paging & sorting
            // ==================================================================

            #[tokio::test]
            async fn test_match_all_count_and_summary() {
                let store = seeded().await;
                let all = Predicate::match_all();

                assert_eq!(store.count(&all).await.unwrap(), SAMPLE_COUNT);
                let summary = store.summarize(&all).await.unwrap();
                assert_eq!(summary.total_units_sold, SAMPLE_UNITS);
                assert_close(summary.total_amount, SAMPLE_TOTAL_AMOUNT);
                assert_close(summary.total_discount, SAMPLE_TOTAL_DISCOUNT);
            }

            #[tokio::test]
            async fn test_date_desc_paging() {
                let store = seeded().await;
                let all = Predicate::match_all();
                let sort = build_sort_object(SortSpec::DateDesc);

                let first = store.find_page(&all, sort, 0, 3).await.unwrap();
                assert_eq!(ids(&first), vec!["T008", "T007", "T006"]);

                let second = store.find_page(&all, sort, 3, 3).await.unwrap();
                assert_eq!(ids(&second), vec!["T005", "T004", "T003"]);

                let last = store.find_page(&all, sort, 6, 3).await.unwrap();
                assert_eq!(ids(&last), vec!["T002", "T001"]);

                let beyond = store.find_page(&all, sort, 9, 3).await.unwrap();
                assert!(beyond.is_empty());
            }

            #[tokio::test]
            async fn test_date_asc() {
                let store = seeded().await;
                let page = store
                    .find_page(
                        &Predicate::match_all(),
                        build_sort_object(SortSpec::DateAsc),
                        0,
                        2,
                    )
                    .await
                    .unwrap();
                assert_eq!(ids(&page), vec!["T001", "T002"]);
            }

            #[tokio::test]
            async fn test_quantity_sorts() {
                let store = seeded().await;
                let all = Predicate::match_all();

                let desc = store
                    .find_page(&all, build_sort_object(SortSpec::QuantityDesc), 0, 100)
                    .await
                    .unwrap();
                let quantities: Vec<u32> = desc.iter().map(|t| t.quantity).collect();
                assert!(quantities.windows(2).all(|w| w[0] >= w[1]), "{:?}", quantities);
                assert_eq!(desc[0].transaction_id, "T008");

                let asc = store
                    .find_page(&all, build_sort_object(SortSpec::QuantityAsc), 0, 100)
                    .await
                    .unwrap();
                let quantities: Vec<u32> = asc.iter().map(|t| t.quantity).collect();
                assert!(quantities.windows(2).all(|w| w[0] <= w[1]), "{:?}", quantities);
                assert_eq!(asc[0].transaction_id, "T002");
            }

            #[tokio::test]
            async fn test_tied_sort_keys_page_deterministically() {
                let store = seeded().await;
                let all = Predicate::match_all();
                let sort = build_sort_object(SortSpec::QuantityAsc);

                // T004 and T007 share quantity 2 at positions 1 and 2
                let mut runs = Vec::new();
                for _ in 0..2 {
                    let mut run = Vec::new();
                    for skip in 1..3 {
                        let page = store.find_page(&all, sort, skip, 1).await.unwrap();
                        assert_eq!(page.len(), 1);
                        run.push(page[0].transaction_id.clone());
                    }
                    runs.push(run);
                }

                assert_eq!(runs[0], runs[1]);
                let mut tied = runs[0].clone();
                tied.sort();
                assert_eq!(tied, vec!["T004", "T007"]);
            }

            #[tokio::test]
            async fn test_customer_name_sort_is_case_sensitive() {
                let store = seeded().await;
                let page = store
                    .find_page(
                        &Predicate::match_all(),
                        build_sort_object(SortSpec::CustomerNameAsc),
                        0,
                        100,
                    )
                    .await
                    .unwrap();
                let names: Vec<&str> = page.iter().map(|t| t.customer_name.as_str()).collect();
                assert!(names.windows(2).all(|w| w[0] <= w[1]), "{:?}", names);
                assert_eq!(names.first(), Some(&"Anita Rao"));
                assert_eq!(names.last(), Some(&"arjun mehta"));
            }

            // ==================================================================
            // Search
            // ==================================================================

            #[tokio::test]
            async fn test_search_name_case_insensitive() {
                let store = seeded().await;
                let predicate = build_search_query("NEHA");
                assert_eq!(matching_ids(&store, &predicate).await, set_of(&["T001", "T005"]));
                assert_eq!(store.count(&predicate).await.unwrap(), 2);
            }

            #[tokio::test]
            async fn test_search_phone_substring() {
                let store = seeded().await;
                let predicate = build_search_query("98765");
                assert_eq!(matching_ids(&store, &predicate).await, set_of(&["T001"]));
            }

            #[tokio::test]
            async fn test_search_metacharacters_are_literal() {
                let store = seeded().await;
                for term in ["a.b", "(", "Neha.*", "[0-9]+"] {
                    let predicate = build_search_query(term);
                    assert_eq!(store.count(&predicate).await.unwrap(), 0, "term {:?}", term);
                }
            }

            // ==================================================================
            // Filters
            // ==================================================================

            #[tokio::test]
            async fn test_filter_regions() {
                let store = seeded().await;
                let filters = FilterSpec {
                    regions: set_of(&["North", "East"]),
                    ..Default::default()
                };
                let predicate = build_filter_query(&filters);
                assert_eq!(
                    matching_ids(&store, &predicate).await,
                    set_of(&["T001", "T003", "T005", "T008"])
                );
            }

            #[tokio::test]
            async fn test_filters_combine_with_and() {
                let store = seeded().await;
                let filters = FilterSpec {
                    regions: set_of(&["North", "East"]),
                    genders: set_of(&["Female"]),
                    ..Default::default()
                };
                let predicate = build_filter_query(&filters);
                assert_eq!(
                    matching_ids(&store, &predicate).await,
                    set_of(&["T001", "T003", "T005"])
                );

                let narrower = FilterSpec {
                    categories: set_of(&["Electronics"]),
                    ..filters
                };
                let predicate = build_filter_query(&narrower);
                assert_eq!(matching_ids(&store, &predicate).await, set_of(&["T005"]));
            }

            #[tokio::test]
            async fn test_filter_tags_any_of() {
                let store = seeded().await;
                let filters = FilterSpec {
                    tags: set_of(&["gift", "gadget"]),
                    ..Default::default()
                };
                let predicate = build_filter_query(&filters);
                assert_eq!(
                    matching_ids(&store, &predicate).await,
                    set_of(&["T001", "T002", "T005", "T007"])
                );
            }

            #[tokio::test]
            async fn test_filter_payment_methods() {
                let store = seeded().await;
                let filters = FilterSpec {
                    payment_methods: set_of(&["UPI"]),
                    ..Default::default()
                };
                let predicate = build_filter_query(&filters);
                assert_eq!(
                    matching_ids(&store, &predicate).await,
                    set_of(&["T001", "T004", "T008"])
                );
            }

            #[tokio::test]
            async fn test_filter_age_range_excludes_missing_age() {
                let store = seeded().await;
                let filters = FilterSpec {
                    age_range: AgeRange::new(Some(30), Some(45)),
                    ..Default::default()
                };
                let predicate = build_filter_query(&filters);
                assert_eq!(
                    matching_ids(&store, &predicate).await,
                    set_of(&["T002", "T003", "T006"])
                );

                let open_ended = FilterSpec {
                    age_range: AgeRange::new(Some(60), None),
                    ..Default::default()
                };
                let predicate = build_filter_query(&open_ended);
                assert_eq!(matching_ids(&store, &predicate).await, set_of(&["T008"]));
            }

            #[tokio::test]
            async fn test_filter_date_range_inclusive() {
                let store = seeded().await;
                let filters = FilterSpec {
                    date_range: DateRange::new(
                        parse_date_bound("2023-03-15T10:00:00Z"),
                        parse_date_bound("2023-06-30"),
                    ),
                    ..Default::default()
                };
                let predicate = build_filter_query(&filters);
                // T006 falls on the end day but after midnight
                assert_eq!(
                    matching_ids(&store, &predicate).await,
                    set_of(&["T003", "T004", "T005"])
                );
            }

            #[tokio::test]
            async fn test_filtered_summary() {
                let store = seeded().await;
                let filters = FilterSpec {
                    regions: set_of(&["North"]),
                    ..Default::default()
                };
                let summary = store.summarize(&build_filter_query(&filters)).await.unwrap();
                assert_eq!(summary.total_units_sold, 7);
                assert_close(summary.total_amount, 13_500.0);
                assert_close(summary.total_discount, 1_350.0);
            }

            #[tokio::test]
            async fn test_search_and_filters_combined() {
                let store = seeded().await;
                let filters = FilterSpec {
                    categories: set_of(&["Electronics"]),
                    ..Default::default()
                };
                let predicate = combine(build_search_query("neha"), build_filter_query(&filters));
                assert_eq!(matching_ids(&store, &predicate).await, set_of(&["T005"]));
                assert_eq!(store.count(&predicate).await.unwrap(), 1);
            }

            #[tokio::test]
            async fn test_no_match() {
                let store = seeded().await;
                let filters = FilterSpec {
                    regions: set_of(&["Atlantis"]),
                    ..Default::default()
                };
                let predicate = build_filter_query(&filters);
                assert_eq!(store.count(&predicate).await.unwrap(), 0);
                let summary = store.summarize(&predicate).await.unwrap();
                assert_eq!(summary.total_units_sold, 0);
                assert_close(summary.total_discount, 0.0);
            }

            // ==================================================================
            // Filter options
            // ==================================================================

            #[tokio::test]
            async fn test_distinct_values() {
                let store = seeded().await;

                let mut regions = store.distinct_values(Field::CustomerRegion).await.unwrap();
                regions.sort();
                assert_eq!(regions, vec!["Central", "East", "North", "South", "West"]);

                let mut tags = store.distinct_values(Field::Tags).await.unwrap();
                tags.sort();
                assert_eq!(tags, vec!["gadget", "gift", "organic", "sale"]);

                let mut payments = store.distinct_values(Field::PaymentMethod).await.unwrap();
                payments.sort();
                assert_eq!(
                    payments,
                    vec!["Cash", "Credit Card", "Debit Card", "UPI", "Wallet"]
                );
            }

            #[tokio::test]
            async fn test_age_bounds_ignore_missing() {
                let store = seeded().await;
                assert_eq!(store.age_bounds().await.unwrap(), Some((19, 64)));
            }
        }
    };
}
