use crate::api::models::AppState;
use crate::api::stats::handlers::stats_handler;
use axum::{Router, routing::get};

pub fn routes() -> Router<AppState> {
    Router::new().route("/reviews/stats/{product_id}", get(stats_handler))
}
