pub mod auth;
pub mod models;
pub mod review;
pub mod stats;

// Re-exports
pub use models::*;

use axum::{Json, Router, routing::get};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::openapi::security::SecurityRequirement;
use utoipa::{Modify, OpenApi};

/// Health check for API availability. No auth, suitable for
/// readiness/liveness probes.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    security(()),
    responses(
        (status = 200, description = "Service is up", body = HealthResponse),
    )
)]
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}

async fn openapi_handler() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the full application router
pub fn router(state: AppState) -> Router {
    // CORS layer for local development
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/api-docs/openapi.json", get(openapi_handler))
        .merge(review::routes())
        .merge(stats::routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// OpenAPI documentation for the service
#[derive(OpenApi)]
#[openapi(
    paths(
        health_handler,
        review::handlers::submit_review_handler,
        stats::handlers::stats_handler,
    ),
    components(schemas(
        ReviewRequest,
        ReviewResponse,
        StatsResponse,
        HealthResponse,
        ErrorResponse,
        crate::sentiment::SentimentLabel,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service availability"),
        (name = "Sentiment", description = "Review sentiment analysis and per-product statistics")
    )
)]
pub struct ApiDoc;

/// Declares the X-API-Key header scheme and applies it to every operation by
/// default; the health route opts out with an empty requirement.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert(utoipa::openapi::Components::new());
        components.add_security_scheme(
            "ApiKeyHeader",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(auth::API_KEY_HEADER))),
        );
        openapi.security = Some(vec![SecurityRequirement::new(
            "ApiKeyHeader",
            Vec::<String>::new(),
        )]);
    }
}
