//! In-Memory Job Manager Implementation

use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::application::pipeline::PipelineStage;
use crate::application::ports::{GenerationJob, JobError, JobManagerPort, JobState};
use crate::domain::book::BookId;

/// 内存任务管理器
pub struct InMemoryJobManager {
    /// job_id -> GenerationJob
    jobs: DashMap<String, GenerationJob>,
    /// 任务队列发送端
    queue_sender: mpsc::Sender<String>,
}

impl InMemoryJobManager {
    pub fn new(queue_sender: mpsc::Sender<String>) -> Self {
        Self {
            jobs: DashMap::new(),
            queue_sender,
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    fn with_job<F>(&self, job_id: &str, f: F) -> Result<(), JobError>
    where
        F: FnOnce(&mut GenerationJob) -> Result<(), JobError>,
    {
        let mut job = self
            .jobs
            .get_mut(job_id)
            .ok_or_else(|| JobError::NotFound(job_id.to_string()))?;
        f(&mut job)
    }
}

/// 已结束的任务不再接受状态变更
fn ensure_active(job: &GenerationJob) -> Result<(), JobError> {
    if job.state.is_finished() {
        return Err(JobError::InvalidStateTransition(format!(
            "job {} is already {}",
            job.job_id,
            job.state.as_str()
        )));
    }
    Ok(())
}

impl JobManagerPort for InMemoryJobManager {
    fn submit(&self, job: GenerationJob) -> Result<String, JobError> {
        let job_id = job.job_id.clone();
        self.jobs.insert(job_id.clone(), job);

        if let Err(e) = self.queue_sender.try_send(job_id.clone()) {
            self.jobs.remove(&job_id);
            tracing::warn!(job_id = %job_id, error = %e, "Failed to enqueue job");
            return Err(match e {
                mpsc::error::TrySendError::Full(_) => JobError::QueueFull,
                mpsc::error::TrySendError::Closed(_) => JobError::QueueClosed,
            });
        }

        tracing::debug!(job_id = %job_id, "Job submitted");
        Ok(job_id)
    }

    fn get_job(&self, job_id: &str) -> Option<GenerationJob> {
        self.jobs.get(job_id).map(|j| j.clone())
    }

    fn list_jobs(&self) -> Vec<GenerationJob> {
        let mut jobs: Vec<GenerationJob> = self.jobs.iter().map(|j| j.clone()).collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        jobs
    }

    fn set_running(&self, job_id: &str) -> Result<(), JobError> {
        self.with_job(job_id, |job| {
            if job.state != JobState::Queued {
                return Err(JobError::InvalidStateTransition(format!(
                    "job {} cannot start from {}",
                    job.job_id,
                    job.state.as_str()
                )));
            }
            job.state = JobState::Running;
            tracing::debug!(job_id = %job.job_id, "Job running");
            Ok(())
        })
    }

    fn update_progress(
        &self,
        job_id: &str,
        stage: PipelineStage,
        progress: f32,
    ) -> Result<(), JobError> {
        self.with_job(job_id, |job| {
            ensure_active(job)?;
            job.stage = stage;
            // 进度只增不减
            job.progress = progress.clamp(0.0, 1.0).max(job.progress);
            Ok(())
        })
    }

    fn add_warning(&self, job_id: &str, warning: String) -> Result<(), JobError> {
        self.with_job(job_id, |job| {
            job.warnings.push(warning);
            Ok(())
        })
    }

    fn set_completed(&self, job_id: &str, book_id: BookId) -> Result<(), JobError> {
        self.with_job(job_id, |job| {
            ensure_active(job)?;
            job.state = JobState::Completed;
            job.stage = PipelineStage::Assembled;
            job.progress = 1.0;
            job.book_id = Some(book_id);
            job.completed_at = Some(Utc::now());
            Ok(())
        })
    }

    fn set_failed(
        &self,
        job_id: &str,
        stage: PipelineStage,
        error: String,
    ) -> Result<(), JobError> {
        self.with_job(job_id, |job| {
            ensure_active(job)?;
            job.state = JobState::Failed;
            job.stage = stage;
            job.error = Some(error);
            job.completed_at = Some(Utc::now());
            Ok(())
        })
    }
}
