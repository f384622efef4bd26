//! ServerBuilder for fluent API to build HTTP servers

use super::router::{build_sales_routes, health_routes, mount};
use crate::config::AppConfig;
use crate::core::cache::Cache;
use crate::core::store::TransactionStore;
use crate::sales::handlers::AppState;
use crate::sales::{FilterOptionsService, SalesCache, TransactionQueryService};
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Builder for the sales HTTP server
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_store(InMemoryTransactionStore::new())
///     .with_config(AppConfig::default())
///     .build()?;
/// ```
pub struct ServerBuilder {
    store: Option<Arc<dyn TransactionStore>>,
    cache: Option<Arc<SalesCache>>,
    config: AppConfig,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder with the default configuration
    pub fn new() -> Self {
        Self {
            store: None,
            cache: None,
            config: AppConfig::default(),
            custom_routes: Vec::new(),
        }
    }

    /// Set the transaction store (required)
    pub fn with_store(mut self, store: impl TransactionStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// Set an already shared transaction store
    pub fn with_shared_store(mut self, store: Arc<dyn TransactionStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Inject the cache instead of creating one
    ///
    /// Useful when the caller needs to inspect or clear the cache.
    pub fn with_cache(mut self, cache: Arc<SalesCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Add custom routes to the server
    ///
    /// Custom routes are mounted under the same base path as the sales routes.
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Wire the services around the store and the shared cache
    pub fn build_state(&self, cache: Arc<SalesCache>) -> Result<AppState> {
        let store = self
            .store
            .clone()
            .ok_or_else(|| anyhow::anyhow!("TransactionStore is required. Call .with_store()"))?;

        let transactions = TransactionQueryService::new(store.clone(), cache.clone())
            .with_ttl(self.config.cache.transactions_ttl());
        let filter_options = FilterOptionsService::new(store, cache)
            .with_ttl(self.config.cache.filter_options_ttl());

        Ok(AppState {
            transactions: Arc::new(transactions),
            filter_options: Arc::new(filter_options),
            default_page_size: self.config.pagination.default_page_size,
        })
    }

    /// Build the router and hand back the cache it serves from
    fn build_app(mut self) -> Result<(Router, Arc<SalesCache>)> {
        self.config.validate()?;

        let cache = self.cache.take().unwrap_or_else(|| {
            Arc::new(Cache::with_default_ttl(self.config.cache.default_ttl()))
        });
        let state = self.build_state(cache.clone())?;

        let mut routes = health_routes().merge(build_sales_routes(state));
        for custom_router in std::mem::take(&mut self.custom_routes) {
            routes = routes.merge(custom_router);
        }

        let app = mount(&self.config.server.base_path, routes).layer(TraceLayer::new_for_http());

        Ok((app, cache))
    }

    /// Build the final REST router
    pub fn build(self) -> Result<Router> {
        Ok(self.build_app()?.0)
    }

    /// Serve the application with graceful shutdown
    ///
    /// This will:
    /// - Bind to the configured host and port
    /// - Start the cache sweeper
    /// - Handle SIGTERM and SIGINT (Ctrl+C) for graceful shutdown
    pub async fn serve(self) -> Result<()> {
        let addr = self.config.server.addr();
        let sweep_interval = self.config.cache.sweep_interval();

        let (app, cache) = self.build_app()?;
        let sweeper = cache.spawn_sweeper(sweep_interval);

        let listener = TcpListener::bind(&addr).await?;
        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        sweeper.stop();
        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
