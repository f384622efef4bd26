//! Server module for building the HTTP server
//!
//! This module provides a `ServerBuilder` that wires the transaction store,
//! the shared cache and the sales services into an Axum router mounted under
//! the configured base path.

pub mod builder;
pub mod router;

pub use builder::ServerBuilder;
pub use router::{build_sales_routes, health_routes};
