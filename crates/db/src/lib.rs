pub mod fixtures;
pub mod store;

pub use fixtures::{seed_demo_catalog, SeedResult};
pub use store::{CatalogCounts, CatalogStore, StoreError};
