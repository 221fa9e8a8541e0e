use crate::api::auth::verify_api_key;
use crate::api::models::*;
use axum::{
    Json,
    extract::{Path, State},
    http::HeaderMap,
};
use tracing::info;

/// Sentiment distribution across all stored reviews of one product.
///
/// An empty product is a 404, not a zero-filled distribution: "no opinion
/// data" is distinct from "a label was never observed".
#[utoipa::path(
    get,
    path = "/reviews/stats/{product_id}",
    tag = "Sentiment",
    params(
        ("product_id" = String, Path, description = "ID of the product to fetch stats for")
    ),
    responses(
        (status = 200, description = "Statistics retrieved", body = StatsResponse),
        (status = 401, description = "Missing or invalid API key", body = ErrorResponse),
        (status = 404, description = "No reviews found for this product", body = ErrorResponse),
    )
)]
pub async fn stats_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(product_id): Path<String>,
) -> Result<Json<StatsResponse>, AppError> {
    verify_api_key(&headers, &state.config)?;

    info!(product_id = %product_id, "Computing sentiment stats");

    let distribution = state
        .repository
        .sentiment_distribution(&product_id)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to read reviews: {}", e)))?;

    match distribution {
        Some(dist) => Ok(Json(StatsResponse {
            product_id,
            positive: dist.positive,
            neutral: dist.neutral,
            negative: dist.negative,
        })),
        None => Err(AppError::NotFound(format!(
            "No reviews found for product '{}'",
            product_id
        ))),
    }
}
