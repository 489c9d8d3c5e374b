use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::api::AppState;

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub environment: String,
    pub mpesa_mode: String,
    pub mpesa_configured: bool,
}

pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, StatusCode> {
    let version = env!("CARGO_PKG_VERSION").to_string();

    let response = HealthResponse {
        status: "healthy".to_string(),
        version,
        environment: state.config.server.environment.clone(),
        mpesa_mode: state.config.mpesa.mode.as_str().to_string(),
        mpesa_configured: state.config.mpesa.has_credentials(),
    };

    Ok(Json(response))
}
