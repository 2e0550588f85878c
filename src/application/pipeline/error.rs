//! Pipeline Error - 流水线终止错误

use thiserror::Error;

use super::PipelineStage;
use crate::application::ports::ProviderError;
use crate::domain::book::BookError;

/// 流水线错误
///
/// 只有大纲和章节失败会终止流水线，朗读、封面、角色失败只记录警告
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Outline generation failed: {0}")]
    OutlineFailed(#[source] ProviderError),

    #[error("Outline generation returned no chapter titles")]
    EmptyOutline,

    #[error(
        "Chapter at index {index} (\"{title}\") failed after {completed} completed chapter(s): {source}"
    )]
    ChapterFailed {
        index: usize,
        title: String,
        completed: usize,
        source: ProviderError,
    },

    #[error("Book assembly failed: {0}")]
    Assembly(#[from] BookError),
}

impl PipelineError {
    /// 失败时所处的终止阶段
    pub fn stage(&self) -> PipelineStage {
        match self {
            PipelineError::OutlineFailed(_) | PipelineError::EmptyOutline => {
                PipelineStage::OutlineFailed
            }
            PipelineError::ChapterFailed { .. } | PipelineError::Assembly(_) => {
                PipelineStage::ChapterFailed
            }
        }
    }
}
