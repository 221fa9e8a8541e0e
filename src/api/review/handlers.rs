use crate::api::auth::verify_api_key;
use crate::api::models::*;
use crate::repository::ReviewDocument;
use axum::{Json, extract::State, http::HeaderMap, http::StatusCode};
use tracing::info;

/// Analyze a review's sentiment and persist the result.
///
/// Validation runs before the key check so a blank review is always a 400,
/// whatever the caller sends in `X-API-Key`.
#[utoipa::path(
    post,
    path = "/reviews/sentiment",
    tag = "Sentiment",
    request_body = ReviewRequest,
    responses(
        (status = 201, description = "Sentiment analyzed and saved", body = ReviewResponse),
        (status = 400, description = "Review text is empty", body = ErrorResponse),
        (status = 401, description = "Missing or invalid API key", body = ErrorResponse),
    )
)]
pub async fn submit_review_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ReviewRequest>,
) -> Result<(StatusCode, Json<ReviewResponse>), AppError> {
    request.validate().map_err(AppError::BadRequest)?;
    verify_api_key(&headers, &state.config)?;

    info!(product_id = %request.product_id, "Analyzing review");

    let prediction = state
        .analyzer
        .predict(&request.review)
        .map_err(|e| AppError::Internal(format!("Sentiment inference failed: {}", e)))?;

    let document = ReviewDocument {
        product_id: request.product_id.clone(),
        review: request.review,
        sentiment: prediction.label,
        confidence: prediction.confidence,
    };

    state
        .repository
        .insert_review(document)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to store review: {}", e)))?;

    info!(
        product_id = %request.product_id,
        sentiment = %prediction.label,
        confidence = prediction.confidence,
        "Review stored"
    );

    Ok((
        StatusCode::CREATED,
        Json(ReviewResponse {
            sentiment: prediction.label,
            confidence: prediction.confidence,
        }),
    ))
}
