//! Pipeline Stage - 生成流水线状态机

use serde::{Deserialize, Serialize};

/// 流水线阶段
///
/// Configured → OutlineRequested → OutlineParsed → ChaptersGenerating
/// → CoverRequested → CharactersRequested → Assembled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Configured,
    OutlineRequested,
    OutlineParsed,
    ChaptersGenerating,
    CoverRequested,
    CharactersRequested,
    Assembled,
    /// 终止：大纲生成失败或为空
    OutlineFailed,
    /// 终止：章节生成失败
    ChapterFailed,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Configured => "configured",
            PipelineStage::OutlineRequested => "outline_requested",
            PipelineStage::OutlineParsed => "outline_parsed",
            PipelineStage::ChaptersGenerating => "chapters_generating",
            PipelineStage::CoverRequested => "cover_requested",
            PipelineStage::CharactersRequested => "characters_requested",
            PipelineStage::Assembled => "assembled",
            PipelineStage::OutlineFailed => "outline_failed",
            PipelineStage::ChapterFailed => "chapter_failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PipelineStage::Assembled | PipelineStage::OutlineFailed | PipelineStage::ChapterFailed
        )
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
