//! Storyloom - 书籍生成服务
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Book Context: 书籍配置、章节、封面、角色
//! - Outline: 大纲解析
//!
//! 应用层 (application/):
//! - Ports: 端口定义（TextGenerator, ImageGenerator, SpeechSynthesizer, JobManager, Repositories）
//! - Generators: 内容、朗读、封面、插图、角色与肖像生成器
//! - Pipeline: 书籍生成流水线
//! - Commands / Queries: CQRS 处理器
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API + WebSocket
//! - Memory: JobManager 内存实现
//! - Worker: GenerationWorker 后台任务处理
//! - Persistence: Sled 存储
//! - Adapters: OpenRouter, Replicate, HTTP TTS, 导出格式
//! - Events: WebSocket 事件发布

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
