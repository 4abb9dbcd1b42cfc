use axum::{routing::get, Json, Router};
use serde::{Deserialize, Serialize};

use crate::types::ApiResponse;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

pub async fn health_check() -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::success(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

pub fn system_router() -> Router {
    Router::new().route("/health", get(health_check))
}
