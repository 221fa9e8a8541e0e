use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use review_sentiment_api::api::{self, AppState};
use review_sentiment_api::config::{AppConfig, SentimentBackend};
use review_sentiment_api::db;
use review_sentiment_api::repository::{ReviewDocument, ReviewRepository};
use review_sentiment_api::sentiment::{SentimentAnalyzer, SentimentLabel};
use std::sync::Arc;
use tower::ServiceExt;

const TEST_API_KEY: &str = "test-secret";

fn test_config() -> AppConfig {
    AppConfig {
        mongo_uri: std::env::var("MONGO_URI")
            .unwrap_or_else(|_| "mongodb://127.0.0.1:27017".to_string()),
        db_name: "review_sentiment_test".to_string(),
        api_key: TEST_API_KEY.to_string(),
        backend: SentimentBackend::Mock,
        model_id: String::new(),
        max_length: 256,
        host: "127.0.0.1".to_string(),
        port: 0,
    }
}

// The Mongo client connects lazily, so building state does not require a
// running server; only tests that actually hit the database are #[ignore]d.
async fn test_state() -> AppState {
    let config = test_config();
    let client = db::connect(&config.mongo_uri).await.unwrap();
    let database = client.database(&config.db_name);
    AppState {
        repository: ReviewRepository::new(&database),
        analyzer: Arc::new(SentimentAnalyzer::from_config(&config).unwrap()),
        config: Arc::new(config),
    }
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_returns_healthy_without_auth() {
    let app = api::router(test_state().await);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body, serde_json::json!({"status": "healthy"}));
}

#[tokio::test]
async fn submit_without_api_key_is_unauthorized() {
    let app = api::router(test_state().await);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/reviews/sentiment")
                .header("content-type", "application/json")
                .body(Body::from(
                    r#"{"product_id": "SKU-1", "review": "Great product"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["detail"], "Invalid or missing API key.");
}

#[tokio::test]
async fn stats_with_wrong_api_key_is_unauthorized() {
    let app = api::router(test_state().await);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/reviews/stats/SKU-1")
                .header("X-API-Key", "not-the-key")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["detail"], "Invalid or missing API key.");
}

#[tokio::test]
async fn whitespace_review_is_bad_request_with_valid_key() {
    let app = api::router(test_state().await);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/reviews/sentiment")
                .header("content-type", "application/json")
                .header("X-API-Key", TEST_API_KEY)
                .body(Body::from(r#"{"product_id": "SKU-1", "review": "   "}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn whitespace_review_is_bad_request_with_invalid_key() {
    // Validation runs before auth: a blank review is 400 whatever the key.
    let app = api::router(test_state().await);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/reviews/sentiment")
                .header("content-type", "application/json")
                .header("X-API-Key", "not-the-key")
                .body(Body::from(r#"{"product_id": "SKU-1", "review": "   "}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["detail"], "Review text cannot be empty.");
}

#[tokio::test]
async fn openapi_schema_declares_api_key_header() {
    let app = api::router(test_state().await);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api-docs/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let scheme = &body["components"]["securitySchemes"]["ApiKeyHeader"];
    assert_eq!(scheme["type"], "apiKey");
    assert_eq!(scheme["in"], "header");
    assert_eq!(scheme["name"], "X-API-Key");
}

// Requires a running MongoDB at MONGO_URI.
#[tokio::test]
#[ignore]
async fn submit_review_returns_created_with_prediction() {
    let app = api::router(test_state().await);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/reviews/sentiment")
                .header("content-type", "application/json")
                .header("X-API-Key", TEST_API_KEY)
                .body(Body::from(
                    r#"{"product_id": "SKU-live", "review": "Works exactly as advertised"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    let confidence = body["confidence"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&confidence));
    assert!(
        ["positive", "neutral", "negative"].contains(&body["sentiment"].as_str().unwrap())
    );
}

// Requires a running MongoDB at MONGO_URI.
#[tokio::test]
#[ignore]
async fn stats_reflect_stored_reviews() {
    let state = test_state().await;
    let product_id = format!(
        "SKU-stats-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    );

    for label in [
        SentimentLabel::Positive,
        SentimentLabel::Neutral,
        SentimentLabel::Positive,
        SentimentLabel::Negative,
    ] {
        state
            .repository
            .insert_review(ReviewDocument {
                product_id: product_id.clone(),
                review: "seed".to_string(),
                sentiment: label,
                confidence: 0.9,
            })
            .await
            .unwrap();
    }

    let app = api::router(state);
    let request = Request::builder()
        .uri(format!("/reviews/stats/{}", product_id))
        .header("X-API-Key", TEST_API_KEY)
        .body(Body::empty())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["product_id"], product_id);
    assert_eq!(body["positive"], 0.5);
    assert_eq!(body["neutral"], 0.25);
    assert_eq!(body["negative"], 0.25);

    // Idempotent: repeating the query without writes returns the same result
    let request = Request::builder()
        .uri(format!("/reviews/stats/{}", product_id))
        .header("X-API-Key", TEST_API_KEY)
        .body(Body::empty())
        .unwrap();
    let repeat = body_json(app.oneshot(request).await.unwrap()).await;
    assert_eq!(repeat, body);
}

// Requires a running MongoDB at MONGO_URI.
#[tokio::test]
#[ignore]
async fn stats_for_unknown_product_is_not_found() {
    let app = api::router(test_state().await);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/reviews/stats/SKU-no-such-product")
                .header("X-API-Key", TEST_API_KEY)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert!(
        body["detail"]
            .as_str()
            .unwrap()
            .contains("No reviews found")
    );
}
