use crate::api::models::AppError;
use crate::config::AppConfig;
use axum::http::HeaderMap;

/// Header clients must use to send the API key
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Check the shared-secret API key on protected routes. A missing header, a
/// non-UTF-8 value, or a mismatch all reject the same way.
pub fn verify_api_key(headers: &HeaderMap, config: &AppConfig) -> Result<(), AppError> {
    let provided = headers.get(API_KEY_HEADER).and_then(|value| value.to_str().ok());
    match provided {
        Some(key) if key == config.api_key => Ok(()),
        _ => Err(AppError::Unauthorized(
            "Invalid or missing API key.".to_string(),
        )),
    }
}
