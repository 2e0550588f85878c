//! Application State
//!
//! 包含所有 Command/Query Handlers 的应用状态

use std::sync::Arc;

use crate::application::ports::{BookRepositoryPort, BookSerializerPort, JobManagerPort};
use crate::application::{
    // Generators
    CharacterGenerator, PortraitGenerator,
    // Command handlers
    DeleteBookHandler, GenerateBookHandler, GeneratePortraitHandler, RegenerateCharacterHandler,
    // Query handlers
    ExportBookHandler, GetBookHandler, GetCatalogHandler, GetChapterAudioHandler,
    GetCoverHandler, GetIllustrationHandler, GetJobHandler, GetPortraitHandler,
    ListBooksHandler,
};
use crate::infrastructure::events::EventPublisher;

/// 应用状态
pub struct AppState {
    // ========== Ports ==========
    pub job_manager: Arc<dyn JobManagerPort>,
    pub book_repo: Arc<dyn BookRepositoryPort>,
    pub event_publisher: Arc<EventPublisher>,
    /// 已注册的导出格式
    pub export_formats: Vec<&'static str>,

    // ========== Command Handlers ==========
    pub generate_book_handler: GenerateBookHandler,
    pub delete_book_handler: DeleteBookHandler,
    pub regenerate_character_handler: RegenerateCharacterHandler,
    pub generate_portrait_handler: GeneratePortraitHandler,

    // ========== Query Handlers ==========
    pub get_catalog_handler: GetCatalogHandler,
    pub get_job_handler: GetJobHandler,
    pub get_book_handler: GetBookHandler,
    pub list_books_handler: ListBooksHandler,
    pub export_book_handler: ExportBookHandler,
    pub get_chapter_audio_handler: GetChapterAudioHandler,
    pub get_cover_handler: GetCoverHandler,
    pub get_portrait_handler: GetPortraitHandler,
    pub get_illustration_handler: GetIllustrationHandler,
}

/// 书籍生成之后按需调用的生成器，未启用的服务为 None
#[derive(Default)]
pub struct OnDemandGenerators {
    pub characters: Option<Arc<CharacterGenerator>>,
    pub portraits: Option<Arc<PortraitGenerator>>,
}

impl AppState {
    pub fn new(
        job_manager: Arc<dyn JobManagerPort>,
        book_repo: Arc<dyn BookRepositoryPort>,
        event_publisher: Arc<EventPublisher>,
        serializers: Vec<Arc<dyn BookSerializerPort>>,
        generators: OnDemandGenerators,
    ) -> Self {
        let export_formats = serializers.iter().map(|s| s.format().as_str()).collect();

        Self {
            job_manager: job_manager.clone(),
            book_repo: book_repo.clone(),
            event_publisher,
            export_formats,

            generate_book_handler: GenerateBookHandler::new(job_manager.clone()),
            delete_book_handler: DeleteBookHandler::new(book_repo.clone()),
            regenerate_character_handler: RegenerateCharacterHandler::new(
                book_repo.clone(),
                generators.characters,
            ),
            generate_portrait_handler: GeneratePortraitHandler::new(
                book_repo.clone(),
                generators.portraits,
            ),

            get_catalog_handler: GetCatalogHandler::new(),
            get_job_handler: GetJobHandler::new(job_manager),
            get_book_handler: GetBookHandler::new(book_repo.clone()),
            list_books_handler: ListBooksHandler::new(book_repo.clone()),
            export_book_handler: ExportBookHandler::new(book_repo.clone(), serializers),
            get_chapter_audio_handler: GetChapterAudioHandler::new(book_repo.clone()),
            get_cover_handler: GetCoverHandler::new(book_repo.clone()),
            get_portrait_handler: GetPortraitHandler::new(book_repo.clone()),
            get_illustration_handler: GetIllustrationHandler::new(book_repo),
        }
    }
}
