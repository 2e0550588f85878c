//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（TextGenerator、ImageGenerator、SpeechSynthesizer、Repository 等）
//! - generators: 内容、朗读、封面、插图、角色与肖像生成器
//! - pipeline: 书籍生成流水线
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod generators;
pub mod pipeline;
pub mod ports;
pub mod queries;

// Re-exports
pub use commands::{
    handlers::{
        DeleteBookHandler, GenerateBookHandler, GenerateBookResponse, GeneratePortraitHandler,
        RegenerateCharacterHandler,
    },
    DeleteBook, GenerateBook, GeneratePortrait, RegenerateCharacter,
};

pub use error::ApplicationError;

pub use generators::{
    CharacterError, CharacterGenerator, ContentGenerator, CoverGenerator, IllustrationGenerator,
    NarrationError, NarrationGenerator, PortraitGenerator,
};

pub use pipeline::{BookPipeline, PipelineError, PipelineStage};

pub use queries::{
    handlers::{
        BookDetailResponse, BookSummaryResponse, CatalogResponse, CharacterResponse,
        ExportBookHandler, FileResponse, GetBookHandler, GetCatalogHandler,
        GetChapterAudioHandler, GetCoverHandler, GetIllustrationHandler, GetJobHandler,
        GetPortraitHandler, ImageResponse, JobStatusResponse, ListBooksHandler,
    },
    ExportBook, GetBook, GetCatalog, GetChapterAudio, GetCover, GetIllustration, GetJob,
    GetPortrait, ListBooks,
};
