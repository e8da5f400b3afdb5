//! Derived per-category metrics.
//!
//! Nothing here is stored: metrics are recomputed from the products handed in on every call.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::domain::category::Category;
use crate::domain::product::Product;

const RATING_DECIMAL_PLACES: u32 = 2;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryMetrics {
    pub total_products: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub avg_rating: Decimal,
    pub total_stock: u64,
    #[serde(with = "rust_decimal::serde::float")]
    pub min_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub max_price: Decimal,
}

/// A category flattened together with its products and their metrics.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CategoryWithProducts {
    #[serde(flatten)]
    pub category: Category,
    pub products: Vec<Product>,
    pub metrics: CategoryMetrics,
}

impl CategoryWithProducts {
    pub fn build(category: Category, products: Vec<Product>) -> Self {
        let metrics = aggregate(&category, &products);
        Self { category, products, metrics }
    }
}

/// Computes metrics over the products that belong to `category`.
///
/// Products referencing other categories are ignored. An empty category yields all-zero metrics.
pub fn aggregate(category: &Category, products: &[Product]) -> CategoryMetrics {
    let owned: Vec<&Product> =
        products.iter().filter(|product| product.category_id == category.id).collect();
    if owned.is_empty() {
        return CategoryMetrics::default();
    }

    let count = owned.len();
    let rating_sum: Decimal = owned.iter().map(|product| product.rating).sum();
    let avg_rating = (rating_sum / Decimal::from(count))
        .round_dp_with_strategy(RATING_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .normalize();

    let total_stock = owned.iter().map(|product| u64::from(product.stock)).sum();
    let min_price = owned.iter().map(|product| product.price).min().unwrap_or_default();
    let max_price = owned.iter().map(|product| product.price).max().unwrap_or_default();

    CategoryMetrics { total_products: count, avg_rating, total_stock, min_price, max_price }
}
