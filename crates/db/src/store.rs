//! In-memory catalog store.
//!
//! Both collections live behind one lock so cross-entity checks (category resolution on product
//! writes, the reference check on category delete) always see a consistent joint snapshot.

use std::collections::HashSet;
use std::sync::Arc;

use indexmap::IndexMap;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;

use catalog_core::aggregate::{aggregate, CategoryMetrics, CategoryWithProducts};
use catalog_core::domain::category::{Category, CategoryId, CategoryPatch, NewCategory};
use catalog_core::domain::product::{
    NewProduct, Product, ProductId, ProductPatch, ProductWithCategory,
};
use catalog_core::domain::EntityKind;
use catalog_core::errors::{ApplicationError, DomainError};
use catalog_core::ids::{IdentifierGenerator, RandomIdGenerator};

const MAX_ID_ATTEMPTS: usize = 16;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("could not issue a fresh {kind} identifier after {attempts} attempts")]
    IdentifierExhausted { kind: EntityKind, attempts: usize },
}

impl From<StoreError> for ApplicationError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Domain(domain) => Self::Domain(domain),
            other @ StoreError::IdentifierExhausted { .. } => Self::Internal(other.to_string()),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CatalogCounts {
    pub categories: usize,
    pub products: usize,
}

#[derive(Default)]
struct CatalogState {
    categories: IndexMap<CategoryId, Category>,
    products: IndexMap<ProductId, Product>,
    issued: HashSet<(EntityKind, String)>,
}

impl CatalogState {
    fn require_category(&self, id: &CategoryId) -> Result<&Category, DomainError> {
        self.categories
            .get(id)
            .ok_or_else(|| DomainError::not_found(EntityKind::Category, id.as_str()))
    }

    fn require_product(&self, id: &ProductId) -> Result<&Product, DomainError> {
        self.products
            .get(id)
            .ok_or_else(|| DomainError::not_found(EntityKind::Product, id.as_str()))
    }

    fn products_in(&self, category_id: &CategoryId) -> Vec<Product> {
        self.products
            .values()
            .filter(|product| &product.category_id == category_id)
            .cloned()
            .collect()
    }

    fn has_products_in(&self, category_id: &CategoryId) -> bool {
        self.products.values().any(|product| &product.category_id == category_id)
    }

    /// Identifiers are never reissued, even after the record they named is deleted.
    fn issue_id(
        &mut self,
        ids: &dyn IdentifierGenerator,
        kind: EntityKind,
    ) -> Result<String, StoreError> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let candidate = ids.generate(kind);
            if self.issued.insert((kind, candidate.clone())) {
                return Ok(candidate);
            }
        }

        Err(StoreError::IdentifierExhausted { kind, attempts: MAX_ID_ATTEMPTS })
    }
}

/// Sole owner of the catalog's categories and products.
pub struct CatalogStore {
    state: RwLock<CatalogState>,
    ids: Arc<dyn IdentifierGenerator>,
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::new(Arc::new(RandomIdGenerator::default()))
    }
}

impl CatalogStore {
    pub fn new(ids: Arc<dyn IdentifierGenerator>) -> Self {
        Self { state: RwLock::new(CatalogState::default()), ids }
    }

    pub async fn create_category(&self, input: NewCategory) -> Result<Category, StoreError> {
        let draft = input.validate()?;

        let mut state = self.state.write().await;
        let id = CategoryId(state.issue_id(self.ids.as_ref(), EntityKind::Category)?);
        let category = draft.into_category(id.clone());
        state.categories.insert(id, category.clone());

        info!(
            event_name = "catalog.category.created",
            category_id = %category.id.as_str(),
            name = %category.name,
            "category created"
        );
        Ok(category)
    }

    pub async fn list_categories(&self) -> Vec<Category> {
        let state = self.state.read().await;
        state.categories.values().cloned().collect()
    }

    pub async fn get_category(&self, id: &CategoryId) -> Result<Category, StoreError> {
        let state = self.state.read().await;
        Ok(state.require_category(id)?.clone())
    }

    pub async fn update_category(
        &self,
        id: &CategoryId,
        patch: CategoryPatch,
    ) -> Result<Category, StoreError> {
        let mut state = self.state.write().await;
        let updated = patch.apply_to(state.require_category(id)?)?;
        state.categories.insert(id.clone(), updated.clone());

        info!(
            event_name = "catalog.category.updated",
            category_id = %id.as_str(),
            "category updated"
        );
        Ok(updated)
    }

    pub async fn delete_category(&self, id: &CategoryId) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        state.require_category(id)?;
        if state.has_products_in(id) {
            return Err(DomainError::Conflict(
                "Cannot delete category with associated products".to_owned(),
            )
            .into());
        }
        state.categories.shift_remove(id);

        info!(
            event_name = "catalog.category.deleted",
            category_id = %id.as_str(),
            "category deleted"
        );
        Ok(())
    }

    pub async fn create_product(&self, input: NewProduct) -> Result<Product, StoreError> {
        let draft = input.validate()?;

        let mut state = self.state.write().await;
        state.require_category(&draft.category_id)?;
        let id = ProductId(state.issue_id(self.ids.as_ref(), EntityKind::Product)?);
        let product = draft.into_product(id.clone());
        state.products.insert(id, product.clone());

        info!(
            event_name = "catalog.product.created",
            product_id = %product.id.as_str(),
            category_id = %product.category_id.as_str(),
            "product created"
        );
        Ok(product)
    }

    /// Products in insertion order, optionally restricted to an exact category id match.
    /// An unknown category yields an empty list.
    pub async fn list_products(&self, category_id: Option<&CategoryId>) -> Vec<Product> {
        let state = self.state.read().await;
        match category_id {
            Some(category_id) => state.products_in(category_id),
            None => state.products.values().cloned().collect(),
        }
    }

    pub async fn get_product(&self, id: &ProductId) -> Result<Product, StoreError> {
        let state = self.state.read().await;
        Ok(state.require_product(id)?.clone())
    }

    pub async fn get_product_with_category(
        &self,
        id: &ProductId,
    ) -> Result<ProductWithCategory, StoreError> {
        let state = self.state.read().await;
        let product = state.require_product(id)?.clone();
        let category = state.categories.get(&product.category_id).cloned();

        Ok(ProductWithCategory { product, category })
    }

    pub async fn update_product(
        &self,
        id: &ProductId,
        patch: ProductPatch,
    ) -> Result<Product, StoreError> {
        let mut state = self.state.write().await;
        let current = state.require_product(id)?;
        if patch.is_empty() {
            return Err(DomainError::Validation("Nothing to update".to_owned()).into());
        }
        if let Some(category_id) = patch.target_category() {
            state.require_category(&category_id)?;
        }

        let updated = patch.apply_to(current)?;
        state.products.insert(id.clone(), updated.clone());

        info!(
            event_name = "catalog.product.updated",
            product_id = %id.as_str(),
            category_id = %updated.category_id.as_str(),
            "product updated"
        );
        Ok(updated)
    }

    pub async fn delete_product(&self, id: &ProductId) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if state.products.shift_remove(id).is_none() {
            return Err(DomainError::not_found(EntityKind::Product, id.as_str()).into());
        }

        info!(event_name = "catalog.product.deleted", product_id = %id.as_str(), "product deleted");
        Ok(())
    }

    /// The category, its products and their metrics, all read under one lock.
    pub async fn get_category_with_products(
        &self,
        id: &CategoryId,
    ) -> Result<CategoryWithProducts, StoreError> {
        let state = self.state.read().await;
        let category = state.require_category(id)?.clone();
        let products = state.products_in(id);

        Ok(CategoryWithProducts::build(category, products))
    }

    pub async fn category_metrics(&self, id: &CategoryId) -> Result<CategoryMetrics, StoreError> {
        let state = self.state.read().await;
        let category = state.require_category(id)?;

        Ok(aggregate(category, &state.products_in(id)))
    }

    pub async fn counts(&self) -> CatalogCounts {
        let state = self.state.read().await;
        CatalogCounts { categories: state.categories.len(), products: state.products.len() }
    }

    /// Products whose category no longer resolves. Always empty unless the invariant is broken.
    pub async fn dangling_products(&self) -> Vec<ProductId> {
        let state = self.state.read().await;
        state
            .products
            .values()
            .filter(|product| !state.categories.contains_key(&product.category_id))
            .map(|product| product.id.clone())
            .collect()
    }
}
