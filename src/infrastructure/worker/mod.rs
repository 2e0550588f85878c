//! Worker Layer - Background Job Processing
//!
//! 实现 GenerationWorker，处理书籍生成任务

mod generation_worker;

pub use generation_worker::{GenerationWorker, GenerationWorkerConfig};
