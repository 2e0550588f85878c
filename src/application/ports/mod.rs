//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod book_repository;
mod book_serializer;
mod image_generator;
mod job_manager;
mod narration_cache;
mod progress;
mod provider;
mod speech_synthesizer;
mod text_generator;

pub use book_repository::{BookRepositoryPort, RepositoryError};
pub use book_serializer::{BookSerializerPort, ExportError, ExportFormat};
pub use image_generator::{ImageGeneratorPort, ImageRequest};
pub use job_manager::{GenerationJob, JobError, JobManagerPort, JobState};
pub use narration_cache::{generate_cache_key, CacheError, NarrationCachePort};
pub use progress::{NoopProgressReporter, ProgressReporterPort, ProgressUpdate};
pub use provider::ProviderError;
pub use speech_synthesizer::{SpeechRequest, SpeechSynthesizerPort};
pub use text_generator::{ChatMessage, ChatRequest, ChatRole, TextGeneratorPort};
