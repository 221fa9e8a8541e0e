use review_sentiment_api::api::{self, AppState};
use review_sentiment_api::config::AppConfig;
use review_sentiment_api::db;
use review_sentiment_api::repository::ReviewRepository;
use review_sentiment_api::sentiment::SentimentAnalyzer;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging; verbosity comes from RUST_LOG, default info
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    info!("🚀 Starting Review Sentiment API Server");

    // Load configuration
    let config = AppConfig::load()?;
    info!("📋 Configuration loaded");
    info!("   - Database: {}", config.db_name);
    info!("   - Backend: {:?}", config.backend);
    info!("   - Server: {}:{}", config.host, config.port);

    // Connect to MongoDB (lazy; connections open on first operation)
    info!("💾 Creating MongoDB client...");
    let client = db::connect(&config.mongo_uri).await?;
    let database = client.database(&config.db_name);
    let repository = ReviewRepository::new(&database);
    info!("✅ MongoDB client ready");

    // Initialize the sentiment analyzer; the model backend downloads and
    // loads the classifier here, once, not per request
    info!("🧠 Initializing sentiment analyzer...");
    let analyzer = Arc::new(SentimentAnalyzer::from_config(&config)?);
    info!("✅ Sentiment analyzer ready ({})", analyzer.backend_name());

    // Create application state
    let addr = format!("{}:{}", config.host, config.port);
    let state = AppState {
        config: Arc::new(config),
        repository,
        analyzer,
    };

    // Build router with modular routes
    let app = api::router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("🌐 Server listening on http://{}", addr);
    info!("");
    info!("📡 Available endpoints:");
    info!("   GET  /health                      - Health check");
    info!("   POST /reviews/sentiment           - Analyze and store a review");
    info!("   GET  /reviews/stats/{{product_id}}  - Sentiment stats per product");
    info!("   GET  /api-docs/openapi.json       - OpenAPI schema");
    info!("");
    info!("✨ Server is ready to accept requests!");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Close pooled connections on graceful shutdown
    client.shutdown().await;
    info!("👋 Server shutting down gracefully");

    Ok(())
}

/// Graceful shutdown handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("🛑 Shutdown signal received");
}
