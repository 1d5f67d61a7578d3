//! API Routes
//!
//! Configures the Axum router with the proxied catalog routes and the admin surface.

use std::any::Any;

use axum::{
    http::{HeaderValue, Method, Uri},
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, Any as AnyOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use super::admin::{clear_handler, delete_handler, stats_handler};
use super::handlers::{
    group_listing_handler, groups_handler, health_handler, item_handler, list_handler,
    search_handler, AppState,
};
use crate::error::ProxyError;
use crate::middleware::rate_limit;

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /collection` - Paginated listing
/// - `GET /collection/search?q=` - Search
/// - `GET /collection/groups` - Classification groups
/// - `GET /collection/groups/:name` - Listing filtered by group
/// - `GET /collection/:id` - Single resource
/// - `GET /health` - Uptime, memory and cache statistics
/// - `GET /cache/stats` - Cache statistics
/// - `POST /cache/clear` - Drop all cache entries
/// - `DELETE /cache/:key` - Drop one URL-encoded cache key
///
/// # Middleware
/// - Rate limiting: proxied `/collection` routes only
/// - Panic recovery: internal-error envelope
/// - CORS: `cors_origins`, or any origin when empty
/// - Tracing: Logs all requests
pub fn create_router(state: AppState, cors_origins: &[String]) -> Router {
    let collection = Router::new()
        .route("/collection", get(list_handler))
        .route("/collection/search", get(search_handler))
        .route("/collection/groups", get(groups_handler))
        .route("/collection/groups/:name", get(group_listing_handler))
        .route("/collection/:id", get(item_handler))
        .route_layer(middleware::from_fn_with_state(
            state.limiter.clone(),
            rate_limit,
        ));

    Router::new()
        .merge(collection)
        .route("/health", get(health_handler))
        .route("/cache/stats", get(stats_handler))
        .route("/cache/clear", post(clear_handler))
        .route("/cache/:key", delete(delete_handler))
        .fallback(fallback_handler)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(AnyOrigin)
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("Ignoring invalid CORS origin: {}", origin);
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(AnyOrigin)
}

/// Unknown routes get the `not_found` envelope.
async fn fallback_handler(method: Method, uri: Uri) -> ProxyError {
    ProxyError::NotFound(format!("Route {} {} not found", method, uri.path()))
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(msg) = err.downcast_ref::<String>() {
        msg.clone()
    } else if let Some(msg) = err.downcast_ref::<&str>() {
        msg.to_string()
    } else {
        "unknown panic".to_string()
    };

    ProxyError::Internal(format!("handler panicked: {}", detail)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStore;
    use crate::config::TtlTable;
    use crate::middleware::RateLimiter;
    use crate::proxy::ProxyOrchestrator;
    use crate::upstream::UpstreamClient;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use std::time::Duration;
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        let upstream =
            UpstreamClient::new("http://127.0.0.1:1", Duration::from_secs(1), "test").unwrap();
        let proxy =
            ProxyOrchestrator::new(CacheStore::shared(), upstream, "products", TtlTable::default());
        let state = AppState::new(proxy, RateLimiter::new(100, Duration::from_secs(60)));
        create_router(state, &[])
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/cache/stats")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_route_envelope() {
        let app = create_test_app();

        let response = app
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["error"], "not_found");
        assert_eq!(json["message"], "Route GET /nope not found");
    }

    #[tokio::test]
    async fn test_search_without_query_is_bad_request() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/collection/search")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], "client_input_error");
    }

    #[tokio::test]
    async fn test_panic_becomes_internal_error() {
        async fn boom() -> &'static str {
            panic!("kaboom")
        }
        let app = Router::new()
            .route("/boom", get(boom))
            .layer(CatchPanicLayer::custom(handle_panic));

        let response = app
            .oneshot(Request::builder().uri("/boom").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"], "internal_error");
        assert_eq!(json["message"], crate::error::INTERNAL_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn test_cors_preflight_allowed_origin() {
        let upstream =
            UpstreamClient::new("http://127.0.0.1:1", Duration::from_secs(1), "test").unwrap();
        let proxy =
            ProxyOrchestrator::new(CacheStore::shared(), upstream, "products", TtlTable::default());
        let state = AppState::new(proxy, RateLimiter::new(100, Duration::from_secs(60)));
        let app = create_router(state, &["http://localhost:3000".to_string()]);

        let response = app
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/collection")
                    .header(header::ORIGIN, "http://localhost:3000")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:3000"
        );
    }
}
