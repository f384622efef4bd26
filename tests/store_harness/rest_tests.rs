//! Macro-generated REST integration tests.
//!
//! The `rest_integration_tests!` macro drives the full HTTP stack
//! (router → handler → service → store) with `axum_test::TestServer`
//! against any `TransactionStore` backend.

/// Generate REST integration tests over a seeded store.
///
/// `$factory` must evaluate to an EMPTY store; it is re-evaluated per test.
#[macro_export]
macro_rules! rest_integration_tests {
    ($factory:expr) => {
        mod rest_integration_tests {
            use super::*;
            use axum_test::TestServer;
            use retail_sales::core::store::TransactionStore;
            use retail_sales::server::ServerBuilder;
            use serde_json::{Value, json};

            async fn make_server() -> TestServer {
                let store = $factory;
                store
                    .insert_many(sample_transactions())
                    .await
                    .expect("seeding should succeed");
                let router = ServerBuilder::new()
                    .with_store(store)
                    .build()
                    .expect("router should build");
                TestServer::try_new(router).unwrap()
            }

            fn response_ids(body: &Value) -> Vec<String> {
                body["data"]["transactions"]
                    .as_array()
                    .expect("transactions array")
                    .iter()
                    .map(|t| t["transactionId"].as_str().unwrap_or_default().to_string())
                    .collect()
            }

            #[tokio::test]
            async fn test_rest_health() {
                let server = make_server().await;
                let response = server.get("/api/health").await;
                response.assert_status_ok();

                let body: Value = response.json();
                assert_eq!(body["status"], "OK");
                assert_eq!(body["message"], "Server is running");
                assert!(body["timestamp"].is_string());
            }

            #[tokio::test]
            async fn test_rest_default_listing() {
                let server = make_server().await;
                let response = server.get("/api/sales/transactions").await;
                response.assert_status_ok();

                let body: Value = response.json();
                assert_eq!(body["success"], true);
                assert_eq!(
                    body["data"]["pagination"],
                    json!({"currentPage": 1, "pageSize": 10, "totalCount": 8, "totalPages": 1})
                );
                assert_eq!(body["data"]["summary"]["totalUnitsSold"], SAMPLE_UNITS);
                assert_eq!(
                    body["data"]["summary"]["totalAmount"].as_f64(),
                    Some(SAMPLE_TOTAL_AMOUNT)
                );
                assert_eq!(
                    body["data"]["summary"]["totalDiscount"].as_f64(),
                    Some(SAMPLE_TOTAL_DISCOUNT)
                );

                let ids = response_ids(&body);
                assert_eq!(ids.len(), 8);
                assert_eq!(ids[0], "T008");

                let first = &body["data"]["transactions"][0];
                assert_eq!(first["customerName"], "Karan Shah");
                assert_eq!(first["customerRegion"], "East");
                assert_eq!(first["date"], "2023-08-08T10:00:00Z");
            }

            #[tokio::test]
            async fn test_rest_paging() {
                let server = make_server().await;
                let response = server
                    .get("/api/sales/transactions")
                    .add_query_param("page", 2)
                    .add_query_param("pageSize", 3)
                    .await;
                response.assert_status_ok();

                let body: Value = response.json();
                assert_eq!(response_ids(&body), vec!["T005", "T004", "T003"]);
                assert_eq!(body["data"]["pagination"]["totalPages"], 3);
                assert_eq!(body["data"]["pagination"]["currentPage"], 2);
                // Summary covers the whole match set, not the page
                assert_eq!(body["data"]["summary"]["totalUnitsSold"], SAMPLE_UNITS);
            }

            #[tokio::test]
            async fn test_rest_repeated_multi_select() {
                let server = make_server().await;
                let response = server
                    .get("/api/sales/transactions")
                    .add_query_param("regions", "North")
                    .add_query_param("regions", "East")
                    .await;
                response.assert_status_ok();

                let body: Value = response.json();
                assert_eq!(body["data"]["pagination"]["totalCount"], 4);
            }

            #[tokio::test]
            async fn test_rest_search_applies_to_summary() {
                let server = make_server().await;
                let response = server
                    .get("/api/sales/transactions")
                    .add_query_param("search", "  neha ")
                    .await;
                response.assert_status_ok();

                let body: Value = response.json();
                assert_eq!(body["data"]["pagination"]["totalCount"], 2);
                assert_eq!(body["data"]["summary"]["totalUnitsSold"], 7);
                assert_eq!(response_ids(&body), vec!["T005", "T001"]);
            }

            #[tokio::test]
            async fn test_rest_range_filters() {
                let server = make_server().await;
                let response = server
                    .get("/api/sales/transactions")
                    .add_query_param("ageMin", 30)
                    .add_query_param("ageMax", 45)
                    .add_query_param("dateStart", "2023-03-01")
                    .add_query_param("sortBy", "quantity-desc")
                    .await;
                response.assert_status_ok();

                let body: Value = response.json();
                assert_eq!(response_ids(&body), vec!["T006", "T003"]);
            }

            #[tokio::test]
            async fn test_rest_malformed_params_are_normalized() {
                let server = make_server().await;
                let response = server
                    .get("/api/sales/transactions")
                    .add_query_param("page", "abc")
                    .add_query_param("pageSize", "-5")
                    .add_query_param("sortBy", "bogus")
                    .add_query_param("ageMin", "old")
                    .add_query_param("dateEnd", "not-a-date")
                    .add_query_param("regions", "")
                    .await;
                response.assert_status_ok();

                let body: Value = response.json();
                assert_eq!(body["data"]["pagination"]["currentPage"], 1);
                assert_eq!(body["data"]["pagination"]["pageSize"], 10);
                assert_eq!(body["data"]["pagination"]["totalCount"], 8);
                assert_eq!(response_ids(&body)[0], "T008");
            }

            #[tokio::test]
            async fn test_rest_zero_match() {
                let server = make_server().await;
                let response = server
                    .get("/api/sales/transactions")
                    .add_query_param("search", "zzzz-no-such-customer")
                    .await;
                response.assert_status_ok();

                let body: Value = response.json();
                assert_eq!(body["data"]["transactions"], json!([]));
                assert_eq!(
                    body["data"]["pagination"],
                    json!({"currentPage": 1, "pageSize": 10, "totalCount": 0, "totalPages": 0})
                );
                assert_eq!(body["data"]["summary"]["totalUnitsSold"], 0);
            }

            #[tokio::test]
            async fn test_rest_filter_options() {
                let server = make_server().await;
                let response = server.get("/api/sales/filter-options").await;
                response.assert_status_ok();

                let body: Value = response.json();
                assert_eq!(body["success"], true);
                assert_eq!(
                    body["data"],
                    json!({
                        "regions": ["Central", "East", "North", "South", "West"],
                        "genders": ["Female", "Male"],
                        "categories": ["Beauty", "Clothing", "Electronics", "Home"],
                        "tags": ["gadget", "gift", "organic", "sale"],
                        "paymentMethods": ["Cash", "Credit Card", "Debit Card", "UPI", "Wallet"],
                        "ageRange": {"min": 19, "max": 64}
                    })
                );
            }
        }
    };
}
