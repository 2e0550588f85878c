//! Job Manager Port - 生成任务管理
//!
//! 定义任务管理的抽象接口，具体实现在 infrastructure/memory 层

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::application::pipeline::PipelineStage;
use crate::domain::book::{BookConfig, BookId};

/// Job Manager 错误
#[derive(Debug, Error)]
pub enum JobError {
    #[error("Job not found: {0}")]
    NotFound(String),

    #[error("Job queue is full")]
    QueueFull,

    #[error("Job queue is closed")]
    QueueClosed,

    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),
}

/// 任务状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// 排队中
    Queued,
    /// 生成中
    Running,
    /// 已完成
    Completed,
    /// 已失败
    Failed,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Queued => "queued",
            JobState::Running => "running",
            JobState::Completed => "completed",
            JobState::Failed => "failed",
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }
}

/// 生成任务
#[derive(Debug, Clone)]
pub struct GenerationJob {
    pub job_id: String,
    pub config: BookConfig,
    pub state: JobState,
    pub stage: PipelineStage,
    pub progress: f32,
    pub book_id: Option<BookId>,
    pub error: Option<String>,
    pub warnings: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl GenerationJob {
    pub fn new(config: BookConfig) -> Self {
        Self {
            job_id: Uuid::new_v4().to_string(),
            config,
            state: JobState::Queued,
            stage: PipelineStage::Configured,
            progress: 0.0,
            book_id: None,
            error: None,
            warnings: Vec::new(),
            created_at: Utc::now(),
            completed_at: None,
        }
    }
}

/// Job Manager Port
///
/// 管理生成任务的生命周期，所有状态存储在内存中
pub trait JobManagerPort: Send + Sync {
    /// 提交任务到队列，返回 job_id
    fn submit(&self, job: GenerationJob) -> Result<String, JobError>;

    /// 获取任务
    fn get_job(&self, job_id: &str) -> Option<GenerationJob>;

    /// 所有任务，按创建时间倒序
    fn list_jobs(&self) -> Vec<GenerationJob>;

    /// 标记为运行中
    fn set_running(&self, job_id: &str) -> Result<(), JobError>;

    /// 更新阶段与进度
    fn update_progress(
        &self,
        job_id: &str,
        stage: PipelineStage,
        progress: f32,
    ) -> Result<(), JobError>;

    /// 记录非致命警告
    fn add_warning(&self, job_id: &str, warning: String) -> Result<(), JobError>;

    /// 标记完成并关联书籍
    fn set_completed(&self, job_id: &str, book_id: BookId) -> Result<(), JobError>;

    /// 标记失败并记录错误
    fn set_failed(&self, job_id: &str, stage: PipelineStage, error: String)
        -> Result<(), JobError>;
}
