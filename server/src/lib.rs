pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod schema;
pub mod service;
pub mod store;
pub mod telemetry;

use std::sync::Arc;

use axum::extract::MatchedPath;
use axum::http::{header, Method, Request};
use axum::routing::get;
use axum::{middleware, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use crate::config::Config;
use crate::service::RecipeService;

/// Application state shared across all handlers
pub type AppState = Arc<RecipeService>;

/// Build the full application: routes, OpenAPI document, and middleware.
pub fn app(state: AppState, config: &Config) -> Router {
    let mut router = Router::new()
        .merge(api::recipes::router())
        .merge(api::units::router())
        .route("/api-docs/openapi.json", get(api::openapi_json))
        .with_state(state);

    if config.track_db_query_count {
        router = router.layer(middleware::from_fn(
            telemetry::db_query_count_header_middleware,
        ));
    }

    router = router.layer(
        TraceLayer::new_for_http()
            .make_span_with(|request: &Request<_>| {
                let matched_path = request
                    .extensions()
                    .get::<MatchedPath>()
                    .map(MatchedPath::as_str)
                    .unwrap_or(request.uri().path());

                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    path = %matched_path,
                )
            })
            .on_request(|_request: &Request<_>, _span: &Span| {})
            .on_response(
                |response: &axum::http::Response<_>, latency: std::time::Duration, _span: &Span| {
                    let status = response.status().as_u16();
                    if status >= 500 {
                        tracing::error!(
                            status = %status,
                            latency_ms = %latency.as_millis(),
                            "request failed with server error"
                        );
                    } else {
                        tracing::info!(
                            status = %status,
                            latency_ms = %latency.as_millis(),
                            "request completed"
                        );
                    }
                },
            )
            .on_failure(
                |error: tower_http::classify::ServerErrorsFailureClass,
                 latency: std::time::Duration,
                 _span: &Span| {
                    tracing::error!(
                        error = %error,
                        latency_ms = %latency.as_millis(),
                        "request failed"
                    );
                },
            ),
    );

    if let Some(origin) = config.cors_origin.clone() {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(origin)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_headers([header::CONTENT_TYPE])
                .expose_headers([header::LOCATION]),
        );
    }

    // Outermost, so the counter is in scope for everything below it
    router.layer(middleware::from_fn(telemetry::query_counting_middleware))
}
