use crate::api::models::AppState;
use crate::api::review::handlers::submit_review_handler;
use axum::{Router, routing::post};

pub fn routes() -> Router<AppState> {
    Router::new().route("/reviews/sentiment", post(submit_review_handler))
}
