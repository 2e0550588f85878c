//! Pipeline - 书籍生成流水线
//!
//! 大纲 → 章节文本 → 章节朗读 → 封面 → 角色 → 组装

mod error;
mod orchestrator;
mod stage;

pub use error::PipelineError;
pub use orchestrator::BookPipeline;
pub use stage::PipelineStage;
