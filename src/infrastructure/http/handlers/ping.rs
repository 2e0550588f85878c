//! Ping Handler - 健康检查

use axum::Json;
use serde::{Deserialize, Serialize};

use crate::infrastructure::http::dto::ApiResponse;

#[derive(Debug, Serialize, Deserialize)]
pub struct PingResponse {
    pub status: String,
    pub version: String,
}

pub async fn ping() -> Json<ApiResponse<PingResponse>> {
    Json(ApiResponse::success(PingResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}
