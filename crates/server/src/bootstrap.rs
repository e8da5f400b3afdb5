use std::sync::Arc;

use catalog_core::config::AppConfig;
use catalog_db::{seed_demo_catalog, CatalogStore, StoreError};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub store: Arc<CatalogStore>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("demo catalog seeding failed: {0}")]
    Seed(#[source] StoreError),
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(event_name = "system.bootstrap.start", "starting application bootstrap");

    let store = Arc::new(CatalogStore::default());
    if config.catalog.seed_demo_data {
        let seeded = seed_demo_catalog(&store).await.map_err(BootstrapError::Seed)?;
        info!(
            event_name = "system.bootstrap.catalog_seeded",
            categories = seeded.categories_seeded.len(),
            products = seeded.products_seeded,
            "demo catalog seeded"
        );
    } else {
        info!(event_name = "system.bootstrap.catalog_empty", "starting with an empty catalog");
    }

    Ok(Application { config, store })
}
