//! Catalog Handler - 可选配置项

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::application::GetCatalog;
use crate::infrastructure::http::dto::{ApiResponse, CatalogDto};
use crate::infrastructure::http::state::AppState;

/// 书籍类型、每类的题材、语气及章节数范围
pub async fn get_catalog(State(state): State<Arc<AppState>>) -> Json<ApiResponse<CatalogDto>> {
    let catalog = state.get_catalog_handler.handle(GetCatalog);
    Json(ApiResponse::success(CatalogDto::new(
        catalog,
        state.export_formats.clone(),
    )))
}
