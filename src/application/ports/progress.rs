//! Progress Reporter Port - 生成进度通知
//!
//! 流水线只通过该端口向外报告进度，不依赖任何展示层

use serde::Serialize;

use crate::application::pipeline::PipelineStage;

/// 进度更新
#[derive(Debug, Clone, Serialize)]
pub struct ProgressUpdate {
    pub stage: PipelineStage,
    /// 0.0 ..= 1.0
    pub progress: f32,
    /// 当前处理的章节序号（0 起）
    pub chapter_index: Option<usize>,
    pub message: String,
}

impl ProgressUpdate {
    pub fn new(stage: PipelineStage, progress: f32, message: impl Into<String>) -> Self {
        Self {
            stage,
            progress: progress.clamp(0.0, 1.0),
            chapter_index: None,
            message: message.into(),
        }
    }

    pub fn with_chapter(mut self, index: usize) -> Self {
        self.chapter_index = Some(index);
        self
    }
}

/// Progress Reporter Port
pub trait ProgressReporterPort: Send + Sync {
    /// 阶段或进度变化
    fn on_progress(&self, update: ProgressUpdate);

    /// 非致命问题（如朗读或封面失败）
    fn on_warning(&self, message: &str);
}

/// 不做任何事的进度报告器
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgressReporter;

impl ProgressReporterPort for NoopProgressReporter {
    fn on_progress(&self, _update: ProgressUpdate) {}

    fn on_warning(&self, _message: &str) {}
}
