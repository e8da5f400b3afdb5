use std::sync::Arc;

use catalog_core::aggregate::CategoryMetrics;
use catalog_core::config::{AppConfig, LoadOptions};
use catalog_core::ids::SequentialIdGenerator;
use catalog_db::{seed_demo_catalog, CatalogStore};
use serde::Serialize;

use crate::commands::CommandResult;

#[derive(Debug, Serialize)]
struct CategorySummary {
    id: String,
    name: String,
    products: usize,
    metrics: CategoryMetrics,
}

#[derive(Debug, Serialize)]
struct SeedSummary {
    categories: Vec<CategorySummary>,
    total_products: usize,
}

pub fn run() -> CommandResult {
    if let Err(error) = AppConfig::load(LoadOptions::default()) {
        return CommandResult::failure(
            "seed",
            "config_validation",
            format!("configuration issue: {error}"),
            2,
        );
    }

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "seed",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                1,
            );
        }
    };

    let result = runtime.block_on(async {
        let store = CatalogStore::new(Arc::new(SequentialIdGenerator::default()));
        let seeded = seed_demo_catalog(&store)
            .await
            .map_err(|error| ("seed_execution", error.to_string()))?;

        let mut categories = Vec::with_capacity(seeded.categories_seeded.len());
        for id in &seeded.categories_seeded {
            let view = store
                .get_category_with_products(id)
                .await
                .map_err(|error| ("seed_verification", error.to_string()))?;
            categories.push(CategorySummary {
                id: view.category.id.0,
                name: view.category.name,
                products: view.products.len(),
                metrics: view.metrics,
            });
        }

        Ok::<_, (&'static str, String)>(SeedSummary {
            categories,
            total_products: seeded.products_seeded,
        })
    });

    match result {
        Ok(summary) => {
            let message = format!(
                "demo catalog loaded: {} categories, {} products",
                summary.categories.len(),
                summary.total_products
            );
            match serde_json::to_value(&summary) {
                Ok(data) => CommandResult::success_with_data("seed", message, Some(data)),
                Err(error) => CommandResult::failure("seed", "serialization", error.to_string(), 1),
            }
        }
        Err((error_class, message)) => CommandResult::failure("seed", error_class, message, 1),
    }
}
