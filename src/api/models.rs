use crate::config::AppConfig;
use crate::repository::ReviewRepository;
use crate::sentiment::{SentimentAnalyzer, SentimentLabel};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub repository: ReviewRepository,
    pub analyzer: Arc<SentimentAnalyzer>,
}

/// Request to submit a product review for sentiment analysis
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ReviewRequest {
    /// Opaque product identifier reviews are grouped by
    #[schema(example = "SKU-98765")]
    pub product_id: String,
    /// Full text of the review
    #[schema(example = "Absolutely loved the build quality and performance!")]
    pub review: String,
}

impl ReviewRequest {
    /// Validate the request
    pub fn validate(&self) -> Result<(), String> {
        if self.review.trim().is_empty() {
            return Err("Review text cannot be empty.".to_string());
        }
        Ok(())
    }
}

/// Result of analyzing one review
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ReviewResponse {
    pub sentiment: SentimentLabel,
    /// Probability mass on the predicted class, in [0, 1]
    #[schema(example = 0.92)]
    pub confidence: f64,
}

/// Sentiment proportions for one product, summing to ~1.0
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct StatsResponse {
    pub product_id: String,
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
}

/// Health check response
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    #[schema(example = "healthy")]
    pub status: String,
}

/// Error response
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub detail: String,
}

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        (status, Json(ErrorResponse { detail })).into_response()
    }
}
