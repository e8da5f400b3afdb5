use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use catalog_db::CatalogStore;
use chrono::Utc;
use serde::Serialize;
use tracing::warn;

#[derive(Clone)]
pub struct HealthState {
    store: Arc<CatalogStore>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub integrity: HealthCheck,
    pub categories: usize,
    pub products: usize,
    pub checked_at: String,
}

pub fn router(store: Arc<CatalogStore>) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { store })
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let counts = state.store.counts().await;
    let integrity = integrity_check(&state.store).await;
    let ready = integrity.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        integrity,
        categories: counts.categories,
        products: counts.products,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

async fn integrity_check(store: &CatalogStore) -> HealthCheck {
    let dangling = store.dangling_products().await;
    if dangling.is_empty() {
        return HealthCheck {
            status: "ready",
            detail: "every product references an existing category".to_string(),
        };
    }

    warn!(
        event_name = "system.health.integrity_violation",
        dangling_products = dangling.len(),
        "products reference missing categories"
    );
    HealthCheck {
        status: "degraded",
        detail: format!("{} product(s) reference missing categories", dangling.len()),
    }
}
