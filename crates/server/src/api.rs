use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use catalog_core::aggregate::CategoryWithProducts;
use catalog_core::domain::category::{Category, CategoryId, CategoryPatch, NewCategory};
use catalog_core::domain::product::{
    NewProduct, Product, ProductId, ProductPatch, ProductWithCategory,
};
use catalog_db::CatalogStore;
use serde::Deserialize;

use crate::response::ApiError;

#[derive(Clone)]
pub struct ApiState {
    store: Arc<CatalogStore>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductListQuery {
    #[serde(rename = "categoryId")]
    pub category_id: Option<String>,
}

impl ProductListQuery {
    /// An empty `categoryId` means no filter.
    fn category_filter(&self) -> Option<CategoryId> {
        self.category_id.as_deref().filter(|value| !value.is_empty()).map(|value| {
            CategoryId(value.to_owned())
        })
    }
}

pub fn router(store: Arc<CatalogStore>) -> Router {
    Router::new()
        .route("/api/categories", get(list_categories).post(create_category))
        .route(
            "/api/categories/{id}",
            get(get_category).patch(update_category).delete(delete_category),
        )
        .route("/api/categories/{id}/with-products", get(category_with_products))
        .route("/api/products", get(list_products).post(create_product))
        .route("/api/products/{id}", get(get_product).patch(update_product).delete(delete_product))
        .with_state(ApiState { store })
}

async fn create_category(
    State(state): State<ApiState>,
    payload: Result<Json<NewCategory>, JsonRejection>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    let Json(input) = payload?;
    let category = state.store.create_category(input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

async fn list_categories(State(state): State<ApiState>) -> Json<Vec<Category>> {
    Json(state.store.list_categories().await)
}

async fn get_category(
    State(state): State<ApiState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Category>, ApiError> {
    let Path(id) = path?;
    Ok(Json(state.store.get_category(&CategoryId(id)).await?))
}

async fn update_category(
    State(state): State<ApiState>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<CategoryPatch>, JsonRejection>,
) -> Result<Json<Category>, ApiError> {
    let Path(id) = path?;
    let Json(patch) = payload?;
    Ok(Json(state.store.update_category(&CategoryId(id), patch).await?))
}

async fn delete_category(
    State(state): State<ApiState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = path?;
    state.store.delete_category(&CategoryId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn category_with_products(
    State(state): State<ApiState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<CategoryWithProducts>, ApiError> {
    let Path(id) = path?;
    Ok(Json(state.store.get_category_with_products(&CategoryId(id)).await?))
}

async fn create_product(
    State(state): State<ApiState>,
    payload: Result<Json<NewProduct>, JsonRejection>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let Json(input) = payload?;
    let product = state.store.create_product(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

async fn list_products(
    State(state): State<ApiState>,
    query: Result<Query<ProductListQuery>, QueryRejection>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let Query(query) = query?;
    let filter = query.category_filter();
    Ok(Json(state.store.list_products(filter.as_ref()).await))
}

async fn get_product(
    State(state): State<ApiState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<ProductWithCategory>, ApiError> {
    let Path(id) = path?;
    Ok(Json(state.store.get_product_with_category(&ProductId(id)).await?))
}

async fn update_product(
    State(state): State<ApiState>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<ProductPatch>, JsonRejection>,
) -> Result<Json<Product>, ApiError> {
    let Path(id) = path?;
    let Json(patch) = payload?;
    Ok(Json(state.store.update_product(&ProductId(id), patch).await?))
}

async fn delete_product(
    State(state): State<ApiState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = path?;
    state.store.delete_product(&ProductId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
