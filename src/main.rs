//! Retail sales API server
//!
//! Configuration comes from the YAML file named by `RETAIL_SALES_CONFIG`
//! (optional), then environment overrides. A `.env` file is honoured.

use anyhow::Result;
use retail_sales::config::{AppConfig, StorageBackend};
use retail_sales::core::store::TransactionStore;
use retail_sales::server::ServerBuilder;
use retail_sales::storage::InMemoryTransactionStore;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,retail_sales=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load_config()?;
    let store = open_store(&config).await?;

    ServerBuilder::new()
        .with_shared_store(store)
        .with_config(config)
        .serve()
        .await
}

fn load_config() -> Result<AppConfig> {
    let config = match std::env::var("RETAIL_SALES_CONFIG") {
        Ok(path) => {
            tracing::info!("Loading configuration from {}", path);
            AppConfig::from_yaml_file(&path)?
        }
        Err(_) => AppConfig::default(),
    };

    let config = config.apply_env_overrides()?;
    config.validate()?;
    Ok(config)
}

async fn open_store(config: &AppConfig) -> Result<Arc<dyn TransactionStore>> {
    match config.storage.backend {
        StorageBackend::InMemory => {
            tracing::warn!("Serving from an empty in-memory store");
            Ok(Arc::new(InMemoryTransactionStore::new()))
        }
        #[cfg(feature = "mongodb_backend")]
        StorageBackend::Mongodb => {
            use retail_sales::storage::MongoTransactionStore;

            let storage = &config.storage;
            let store = MongoTransactionStore::connect(
                &storage.mongodb_uri,
                &storage.database,
                &storage.collection,
            )
            .await?;
            tracing::info!(
                "Connected to MongoDB database '{}' (collection '{}')",
                storage.database,
                storage.collection
            );

            if storage.ensure_indexes {
                store.ensure_indexes().await?;
            }
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "mongodb_backend"))]
        StorageBackend::Mongodb => Err(anyhow::anyhow!(
            "storage backend 'mongodb' requires the `mongodb_backend` feature"
        )),
    }
}
