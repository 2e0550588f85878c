//! Book Command Handlers

use std::sync::Arc;

use crate::application::commands::{
    DeleteBook, GenerateBook, GeneratePortrait, RegenerateCharacter,
};
use crate::application::error::ApplicationError;
use crate::application::generators::{CharacterGenerator, PortraitGenerator};
use crate::application::ports::{BookRepositoryPort, GenerationJob, JobManagerPort, JobState};
use crate::application::queries::handlers::CharacterResponse;
use crate::domain::book::{Book, BookConfig, BookId, BookType, Tone};

// ============================================================================
// GenerateBook
// ============================================================================

/// 生成书籍响应（任务已入队）
#[derive(Debug, Clone)]
pub struct GenerateBookResponse {
    pub job_id: String,
    pub state: JobState,
    pub title: String,
    pub chapter_count: usize,
}

/// GenerateBook Handler
///
/// 在任何外部调用之前校验配置，然后提交后台任务
pub struct GenerateBookHandler {
    job_manager: Arc<dyn JobManagerPort>,
}

impl GenerateBookHandler {
    pub fn new(job_manager: Arc<dyn JobManagerPort>) -> Self {
        Self { job_manager }
    }

    /// 把原始输入转换为 BookConfig
    pub fn build_config(command: GenerateBook) -> Result<BookConfig, ApplicationError> {
        let book_type: BookType = command.book_type.parse()?;
        let tone: Tone = command.tone.as_deref().unwrap_or_default().parse()?;
        let config = BookConfig::new(
            book_type,
            &command.genre,
            tone,
            command.chapter_count,
            command.title,
            command.description,
        )?;
        Ok(config)
    }

    pub async fn handle(
        &self,
        command: GenerateBook,
    ) -> Result<GenerateBookResponse, ApplicationError> {
        let config = Self::build_config(command)?;
        let title = config.title().to_string();
        let chapter_count = config.chapter_count();

        let job_id = self.job_manager.submit(GenerationJob::new(config))?;

        tracing::info!(
            job_id = %job_id,
            title = %title,
            chapter_count = chapter_count,
            "Book generation queued"
        );

        Ok(GenerateBookResponse {
            job_id,
            state: JobState::Queued,
            title,
            chapter_count,
        })
    }
}

// ============================================================================
// DeleteBook
// ============================================================================

/// DeleteBook Handler
pub struct DeleteBookHandler {
    book_repo: Arc<dyn BookRepositoryPort>,
}

impl DeleteBookHandler {
    pub fn new(book_repo: Arc<dyn BookRepositoryPort>) -> Self {
        Self { book_repo }
    }

    pub async fn handle(&self, command: DeleteBook) -> Result<(), ApplicationError> {
        let book_id = BookId::from_uuid(command.book_id);
        let deleted = self.book_repo.delete(&book_id).await?;
        if !deleted {
            return Err(ApplicationError::not_found("Book", book_id));
        }

        tracing::info!(book_id = %book_id, "Book deleted");
        Ok(())
    }
}

// ============================================================================
// Characters
// ============================================================================

/// 加载书籍并确认角色存在
async fn load_character_book(
    repo: &Arc<dyn BookRepositoryPort>,
    book_id: uuid::Uuid,
    index: usize,
) -> Result<Book, ApplicationError> {
    let id = BookId::from_uuid(book_id);
    let book = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| ApplicationError::not_found("Book", id))?;
    if book.character(index).is_none() {
        return Err(ApplicationError::not_found(
            "Character",
            format!("{}#{}", book.id(), index),
        ));
    }
    Ok(book)
}

fn disabled(service: &str) -> ApplicationError {
    ApplicationError::ExternalServiceError(format!("{} is disabled", service))
}

fn character_response(book: &Book, index: usize) -> Result<CharacterResponse, ApplicationError> {
    CharacterResponse::from_book(book, index)
        .ok_or_else(|| ApplicationError::internal("character vanished after update"))
}

/// RegenerateCharacter Handler
///
/// 新角色替换原位置的角色，原肖像失效
pub struct RegenerateCharacterHandler {
    book_repo: Arc<dyn BookRepositoryPort>,
    generator: Option<Arc<CharacterGenerator>>,
}

impl RegenerateCharacterHandler {
    pub fn new(
        book_repo: Arc<dyn BookRepositoryPort>,
        generator: Option<Arc<CharacterGenerator>>,
    ) -> Self {
        Self {
            book_repo,
            generator,
        }
    }

    pub async fn handle(
        &self,
        command: RegenerateCharacter,
    ) -> Result<CharacterResponse, ApplicationError> {
        let Some(generator) = &self.generator else {
            return Err(disabled("Text generation"));
        };
        let mut book =
            load_character_book(&self.book_repo, command.book_id, command.index).await?;
        let current = book.characters()[command.index].clone();
        let character = generator
            .regenerate_character(book.config(), book.outline(), &current)
            .await?;

        tracing::info!(
            book_id = %book.id(),
            index = command.index,
            previous = %current.name,
            name = %character.name,
            "Character regenerated"
        );
        book.replace_character(command.index, character)?;
        self.book_repo.save(&book).await?;

        character_response(&book, command.index)
    }
}

/// GeneratePortrait Handler
pub struct GeneratePortraitHandler {
    book_repo: Arc<dyn BookRepositoryPort>,
    generator: Option<Arc<PortraitGenerator>>,
}

impl GeneratePortraitHandler {
    pub fn new(
        book_repo: Arc<dyn BookRepositoryPort>,
        generator: Option<Arc<PortraitGenerator>>,
    ) -> Self {
        Self {
            book_repo,
            generator,
        }
    }

    pub async fn handle(
        &self,
        command: GeneratePortrait,
    ) -> Result<CharacterResponse, ApplicationError> {
        let Some(generator) = &self.generator else {
            return Err(disabled("Image generation"));
        };
        let mut book =
            load_character_book(&self.book_repo, command.book_id, command.index).await?;

        let portrait = generator
            .generate_portrait(&book.characters()[command.index])
            .await?;
        book.set_portrait(command.index, portrait)?;
        self.book_repo.save(&book).await?;

        tracing::info!(book_id = %book.id(), index = command.index, "Portrait generated");
        character_response(&book, command.index)
    }
}
