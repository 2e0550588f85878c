//! Job Queries

/// 获取任务状态查询
#[derive(Debug, Clone)]
pub struct GetJob {
    pub job_id: String,
}
