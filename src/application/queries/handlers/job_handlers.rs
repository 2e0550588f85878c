//! Job Query Handler

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::application::error::ApplicationError;
use crate::application::pipeline::PipelineStage;
use crate::application::ports::{GenerationJob, JobManagerPort, JobState};
use crate::application::queries::GetJob;

/// 任务状态响应
#[derive(Debug, Clone)]
pub struct JobStatusResponse {
    pub job_id: String,
    pub state: JobState,
    pub stage: PipelineStage,
    pub progress: f32,
    pub title: String,
    pub book_id: Option<String>,
    pub error: Option<String>,
    pub warnings: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<GenerationJob> for JobStatusResponse {
    fn from(job: GenerationJob) -> Self {
        Self {
            title: job.config.title().to_string(),
            job_id: job.job_id,
            state: job.state,
            stage: job.stage,
            progress: job.progress,
            book_id: job.book_id.map(|id| id.to_string()),
            error: job.error,
            warnings: job.warnings,
            created_at: job.created_at,
            completed_at: job.completed_at,
        }
    }
}

/// GetJob Handler
pub struct GetJobHandler {
    job_manager: Arc<dyn JobManagerPort>,
}

impl GetJobHandler {
    pub fn new(job_manager: Arc<dyn JobManagerPort>) -> Self {
        Self { job_manager }
    }

    pub fn handle(&self, query: GetJob) -> Result<JobStatusResponse, ApplicationError> {
        self.job_manager
            .get_job(&query.job_id)
            .map(JobStatusResponse::from)
            .ok_or_else(|| ApplicationError::not_found("Job", &query.job_id))
    }
}
