use std::any::Any;
use std::time::Instant;

use axum::{
    body::Body,
    extract::Request,
    handler::HandlerWithoutStateExt,
    http::{header, HeaderValue, Method},
    middleware::{from_fn, Next},
    response::{IntoResponse, Response},
    Router,
};
use catalog_core::config::CorsConfig;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, Any as AnyOrigin, CorsLayer},
    services::ServeDir,
};
use tracing::{debug, enabled, error, info, Level};

use crate::bootstrap::Application;
use crate::response::ApiError;
use crate::{api, health};

pub fn router(app: &Application) -> Router {
    let images = ServeDir::new(&app.config.assets.images_dir)
        .call_fallback_on_method_not_allowed(true)
        .not_found_service(not_found.into_service());

    Router::new()
        .merge(api::router(app.store.clone()))
        .merge(health::router(app.store.clone()))
        .nest_service(&app.config.assets.mount_path, images)
        .method_not_allowed_fallback(not_found)
        .fallback(not_found)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(from_fn(log_requests))
        .layer(cors_layer(&app.config.cors))
}

async fn not_found() -> ApiError {
    ApiError::not_found()
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<&str>()
        .map(|message| (*message).to_owned())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "handler panicked".to_owned());
    ApiError::internal(detail).into_response()
}

/// Request bodies larger than this are not echoed to the debug log.
const LOGGED_BODY_LIMIT: u64 = 64 * 1024;

async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started = Instant::now();

    let request = if enabled!(Level::DEBUG) {
        match log_request_body(request).await {
            Ok(request) => request,
            Err(error) => return error.into_response(),
        }
    } else {
        request
    };

    let response = next.run(request).await;

    let status = response.status();
    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    if status.is_server_error() {
        error!(
            event_name = "http.request.completed",
            method = %method,
            path = %path,
            status = status.as_u16(),
            latency_ms,
            "request failed"
        );
    } else {
        info!(
            event_name = "http.request.completed",
            method = %method,
            path = %path,
            status = status.as_u16(),
            latency_ms,
            "request completed"
        );
    }

    response
}

async fn log_request_body(request: Request) -> Result<Request, ApiError> {
    let mutating = [Method::POST, Method::PUT, Method::PATCH].contains(request.method());
    let declared_len = request
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<u64>().ok());
    let Some(len) = declared_len.filter(|len| mutating && *len <= LOGGED_BODY_LIMIT) else {
        return Ok(request);
    };

    let (parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, usize::try_from(len).unwrap_or(usize::MAX))
        .await
        .map_err(|error| ApiError::bad_request(format!("Failed to read request body: {error}")))?;
    debug!(
        event_name = "http.request.body",
        method = %parts.method,
        path = %parts.uri.path(),
        body = %String::from_utf8_lossy(&bytes),
        "request body"
    );

    Ok(Request::from_parts(parts, Body::from(bytes)))
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if config.allowed_origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(AnyOrigin);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
        Router,
    };
    use catalog_core::config::AppConfig;
    use catalog_core::ids::SequentialIdGenerator;
    use catalog_db::CatalogStore;
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::{log_request_body, panic_response, router};
    use crate::bootstrap::Application;

    fn app_with(config: AppConfig) -> Router {
        let store = Arc::new(CatalogStore::new(Arc::new(SequentialIdGenerator::default())));
        router(&Application { config, store })
    }

    fn empty_app() -> Router {
        app_with(AppConfig::default())
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Response {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        app.clone().oneshot(request).await.expect("response")
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn category_lifecycle_follows_status_contract() {
        let app = empty_app();

        let created =
            send(&app, "POST", "/api/categories", Some(json!({ "name": "Guitars" }))).await;
        assert_eq!(created.status(), StatusCode::CREATED);
        assert_eq!(json_body(created).await, json!({ "id": "C1", "name": "Guitars", "description": "" }));

        let listed = send(&app, "GET", "/api/categories", None).await;
        assert_eq!(listed.status(), StatusCode::OK);
        assert_eq!(json_body(listed).await.as_array().map(Vec::len), Some(1));

        let patched =
            send(&app, "PATCH", "/api/categories/C1", Some(json!({ "description": " Six strings " })))
                .await;
        assert_eq!(patched.status(), StatusCode::OK);
        assert_eq!(json_body(patched).await["description"], "Six strings");

        let empty_patch = send(&app, "PATCH", "/api/categories/C1", Some(json!({}))).await;
        assert_eq!(empty_patch.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(empty_patch).await, json!({ "error": "Nothing to update" }));

        let deleted = send(&app, "DELETE", "/api/categories/C1", None).await;
        assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

        let missing = send(&app, "GET", "/api/categories/C1", None).await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(missing).await, json!({ "error": "Category not found" }));
    }

    #[tokio::test]
    async fn blank_category_name_is_rejected() {
        let app = empty_app();

        let response = send(&app, "POST", "/api/categories", Some(json!({ "name": "  " }))).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await, json!({ "error": "Name is required" }));
    }

    #[tokio::test]
    async fn end_to_end_delete_conflict_then_success() {
        let app = empty_app();
        send(&app, "POST", "/api/categories", Some(json!({ "name": "Guitars" }))).await;

        let created = send(
            &app,
            "POST",
            "/api/products",
            Some(json!({ "name": "Tele", "price": 1000, "categoryId": "C1" })),
        )
        .await;
        assert_eq!(created.status(), StatusCode::CREATED);
        let product = json_body(created).await;
        assert_eq!(product["id"], "P1");
        assert_eq!(product["stock"], 0);
        assert_eq!(product["rating"], json!(0.0));

        let conflict = send(&app, "DELETE", "/api/categories/C1", None).await;
        assert_eq!(conflict.status(), StatusCode::CONFLICT);
        assert_eq!(
            json_body(conflict).await,
            json!({ "error": "Cannot delete category with associated products" })
        );

        assert_eq!(send(&app, "DELETE", "/api/products/P1", None).await.status(), StatusCode::NO_CONTENT);
        assert_eq!(
            send(&app, "DELETE", "/api/categories/C1", None).await.status(),
            StatusCode::NO_CONTENT
        );
    }

    #[tokio::test]
    async fn product_creation_errors_map_to_400_and_404() {
        let app = empty_app();

        let missing = send(&app, "POST", "/api/products", Some(json!({ "name": "Tele" }))).await;
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(missing).await,
            json!({ "error": "Name, price and categoryId are required" })
        );

        let unknown = send(
            &app,
            "POST",
            "/api/products",
            Some(json!({ "name": "Tele", "price": 1000, "categoryId": "nope" })),
        )
        .await;
        assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(unknown).await, json!({ "error": "Category not found" }));
    }

    #[tokio::test]
    async fn product_reads_filter_and_pair_with_category() {
        let app = empty_app();
        send(&app, "POST", "/api/categories", Some(json!({ "name": "Guitars" }))).await;
        send(&app, "POST", "/api/categories", Some(json!({ "name": "Drums" }))).await;
        for (name, category) in [("Strat", "C1"), ("Snare", "C2"), ("Tele", "C1")] {
            send(
                &app,
                "POST",
                "/api/products",
                Some(json!({ "name": name, "price": "500", "categoryId": category })),
            )
            .await;
        }

        let filtered = json_body(send(&app, "GET", "/api/products?categoryId=C1", None).await).await;
        let names: Vec<&str> = filtered
            .as_array()
            .map(|items| items.iter().filter_map(|item| item["name"].as_str()).collect())
            .unwrap_or_default();
        assert_eq!(names, vec!["Strat", "Tele"]);

        let unfiltered = json_body(send(&app, "GET", "/api/products?categoryId=", None).await).await;
        assert_eq!(unfiltered.as_array().map(Vec::len), Some(3));

        let unknown = send(&app, "GET", "/api/products?categoryId=C9", None).await;
        assert_eq!(unknown.status(), StatusCode::OK);
        assert_eq!(json_body(unknown).await, json!([]));

        let paired = json_body(send(&app, "GET", "/api/products/P2", None).await).await;
        assert_eq!(paired["product"]["name"], "Snare");
        assert_eq!(paired["category"]["name"], "Drums");
    }

    #[tokio::test]
    async fn product_patch_is_partial_and_all_or_nothing() {
        let app = empty_app();
        send(&app, "POST", "/api/categories", Some(json!({ "name": "Guitars" }))).await;
        send(
            &app,
            "POST",
            "/api/products",
            Some(json!({ "name": "Tele", "price": 1000, "categoryId": "C1", "rating": 4.5 })),
        )
        .await;

        let stocked = send(&app, "PATCH", "/api/products/P1", Some(json!({ "stock": 3 }))).await;
        assert_eq!(stocked.status(), StatusCode::OK);
        let stocked = json_body(stocked).await;
        assert_eq!(stocked["stock"], 3);
        assert_eq!(stocked["name"], "Tele");
        assert_eq!(stocked["price"], json!(1000.0));
        assert_eq!(stocked["rating"], json!(4.5));

        let retarget = send(
            &app,
            "PATCH",
            "/api/products/P1",
            Some(json!({ "name": "Renamed", "categoryId": "missing" })),
        )
        .await;
        assert_eq!(retarget.status(), StatusCode::NOT_FOUND);

        let unchanged = json_body(send(&app, "GET", "/api/products/P1", None).await).await;
        assert_eq!(unchanged["product"]["name"], "Tele");

        let empty = send(&app, "PATCH", "/api/products/P1", Some(json!({ "unknown": 1 }))).await;
        assert_eq!(empty.status(), StatusCode::BAD_REQUEST);

        let absent = send(&app, "PATCH", "/api/products/P9", Some(json!({ "stock": 1 }))).await;
        assert_eq!(absent.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(absent).await, json!({ "error": "Product not found" }));
    }

    #[tokio::test]
    async fn category_with_products_reports_metrics() {
        let app = empty_app();
        send(&app, "POST", "/api/categories", Some(json!({ "name": "Audio" }))).await;
        for (price, rating) in [(9500, 4.91), (14500, 4.87)] {
            send(
                &app,
                "POST",
                "/api/products",
                Some(json!({
                    "name": "Item",
                    "price": price,
                    "categoryId": "C1",
                    "stock": 5,
                    "rating": rating
                })),
            )
            .await;
        }

        let response = send(&app, "GET", "/api/categories/C1/with-products", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;

        assert_eq!(body["name"], "Audio");
        assert_eq!(body["products"].as_array().map(Vec::len), Some(2));
        assert_eq!(
            body["metrics"],
            json!({
                "totalProducts": 2,
                "avgRating": 4.89,
                "totalStock": 10,
                "minPrice": 9500.0,
                "maxPrice": 14500.0
            })
        );

        let missing = send(&app, "GET", "/api/categories/C9/with-products", None).await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn malformed_json_is_a_400_with_error_body() {
        let app = empty_app();
        let request = Request::builder()
            .method("POST")
            .uri("/api/categories")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .expect("request");

        let response = app.oneshot(request).await.expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn unknown_routes_return_json_404() {
        let app = empty_app();

        let response = send(&app, "GET", "/api/unknown", None).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await, json!({ "error": "Not found" }));
    }

    #[tokio::test]
    async fn wrong_methods_on_known_paths_return_json_404() {
        let app = empty_app();

        for (method, uri) in [
            ("PUT", "/api/products/P1"),
            ("POST", "/api/categories/C1"),
            ("DELETE", "/api/categories"),
            ("POST", "/health"),
            ("POST", "/images/violin.jpg"),
        ] {
            let response = send(&app, method, uri, None).await;

            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{method} {uri}");
            assert_eq!(json_body(response).await, json!({ "error": "Not found" }), "{method} {uri}");
        }
    }

    #[tokio::test]
    async fn undecodable_path_ids_are_a_400_with_error_body() {
        let app = empty_app();

        for uri in ["/api/categories/%FF", "/api/products/%C3%28"] {
            let response = send(&app, "GET", uri, None).await;

            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
            assert!(json_body(response).await["error"].is_string(), "{uri}");
        }
    }

    #[tokio::test]
    async fn oversized_prices_are_reported_as_out_of_range() {
        let app = empty_app();
        send(&app, "POST", "/api/categories", Some(json!({ "name": "Guitars" }))).await;

        let response = send(
            &app,
            "POST",
            "/api/products",
            Some(json!({ "name": "Tele", "price": 1e29, "categoryId": "C1" })),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await, json!({ "error": "Price is out of range" }));
    }

    #[tokio::test]
    async fn logged_request_bodies_are_passed_on_intact() {
        let payload = r#"{"name":"Guitars"}"#;
        let request = Request::builder()
            .method("POST")
            .uri("/api/categories")
            .header(header::CONTENT_LENGTH, payload.len())
            .body(Body::from(payload))
            .expect("request");

        let request = log_request_body(request).await.expect("buffered request");

        let bytes = axum::body::to_bytes(request.into_body(), usize::MAX).await.expect("body");
        assert_eq!(&bytes[..], payload.as_bytes());
    }

    #[tokio::test]
    async fn images_are_served_from_configured_directory() {
        let dir = TempDir::new().expect("tempdir");
        fs::write(dir.path().join("violin.jpg"), b"jpeg-bytes").expect("write image");
        let mut config = AppConfig::default();
        config.assets.images_dir = dir.path().to_path_buf();
        let app = app_with(config);

        let found = send(&app, "GET", "/images/violin.jpg", None).await;
        assert_eq!(found.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(found.into_body(), usize::MAX).await.expect("body");
        assert_eq!(&bytes[..], b"jpeg-bytes");

        let missing = send(&app, "GET", "/images/absent.jpg", None).await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(missing).await, json!({ "error": "Not found" }));
    }

    #[tokio::test]
    async fn cors_preflight_allows_configured_origin() {
        let app = empty_app();
        let request = Request::builder()
            .method("OPTIONS")
            .uri("/api/products")
            .header(header::ORIGIN, "http://localhost:3001")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PATCH")
            .body(Body::empty())
            .expect("request");

        let response = app.oneshot(request).await.expect("response");

        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|value| value.to_str().ok()),
            Some("http://localhost:3001")
        );
    }

    #[tokio::test]
    async fn panics_become_generic_500() {
        let response = panic_response(Box::new("store poisoned"));

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(response).await, json!({ "error": "Internal server error" }));
    }
}
