use anyhow::{Context, Result, bail};
use std::env;

/// Which sentiment backend to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentimentBackend {
    /// Random labels, no model download. For local development and tests.
    Mock,
    /// Pre-trained transformer classifier loaded from the HF hub.
    Model,
}

impl SentimentBackend {
    pub fn parse(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "mock" => Ok(SentimentBackend::Mock),
            "model" => Ok(SentimentBackend::Model),
            other => bail!("Unknown SENTIMENT_BACKEND '{}', expected 'mock' or 'model'", other),
        }
    }
}

/// Application configuration, resolved once at startup from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub mongo_uri: String,
    pub db_name: String,
    pub api_key: String,
    pub backend: SentimentBackend,
    pub model_id: String,
    pub max_length: usize,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    /// Load configuration from environment variables, honoring a `.env` file
    /// if one exists.
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let mongo_uri = env::var("MONGO_URI").context("MONGO_URI must be set")?;
        let db_name = env::var("DB_NAME").context("DB_NAME must be set")?;
        let api_key = env::var("API_KEY").context("API_KEY must be set")?;

        let backend = match env::var("SENTIMENT_BACKEND") {
            Ok(value) => SentimentBackend::parse(&value)?,
            Err(_) => SentimentBackend::Mock,
        };

        let model_id = env::var("MODEL_ID")
            .unwrap_or_else(|_| "clapAI/modernBERT-base-multilingual-sentiment".to_string());

        let max_length = match env::var("MAX_LENGTH") {
            Ok(value) => value.parse::<usize>().context("MAX_LENGTH must be an integer")?,
            Err(_) => 256,
        };

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = match env::var("PORT") {
            Ok(value) => value.parse::<u16>().context("PORT must be a valid port number")?,
            Err(_) => 8000,
        };

        Ok(AppConfig {
            mongo_uri,
            db_name,
            api_key,
            backend,
            model_id,
            max_length,
            host,
            port,
        })
    }
}
