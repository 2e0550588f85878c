//! Job HTTP Handlers

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::application::GetJob;
use crate::infrastructure::http::dto::{ApiResponse, JobStatusDto, JobStatusRequest};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

pub async fn job_status(
    State(state): State<Arc<AppState>>,
    Json(req): Json<JobStatusRequest>,
) -> Result<Json<ApiResponse<JobStatusDto>>, ApiError> {
    let job = state.get_job_handler.handle(GetJob { job_id: req.job_id })?;
    Ok(Json(ApiResponse::success(job.into())))
}
