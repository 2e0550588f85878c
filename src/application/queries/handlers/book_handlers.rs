//! Book Query Handlers

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::application::error::ApplicationError;
use crate::application::ports::{BookRepositoryPort, BookSerializerPort, ExportFormat};
use crate::application::queries::{
    ExportBook, GetBook, GetChapterAudio, GetCover, GetIllustration, GetPortrait, ListBooks,
};
use crate::domain::book::{Book, BookId, Character, ImageRef, MediaKind};

// ============================================================================
// Response DTOs
// ============================================================================

/// 书籍摘要
#[derive(Debug, Clone)]
pub struct BookSummaryResponse {
    pub id: String,
    pub title: String,
    pub subtitle: String,
    pub chapter_count: usize,
    pub narrated_chapters: usize,
    pub has_cover: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Book> for BookSummaryResponse {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id().to_string(),
            title: book.title().to_string(),
            subtitle: book.subtitle(),
            chapter_count: book.chapters().len(),
            narrated_chapters: book.narrated_chapter_count(),
            has_cover: book.cover().is_some(),
            created_at: book.created_at(),
        }
    }
}

/// 章节详情
#[derive(Debug, Clone)]
pub struct ChapterResponse {
    pub index: usize,
    pub heading: String,
    pub title: String,
    pub text: String,
    pub has_audio: bool,
    pub has_illustration: bool,
}

/// 角色及其肖像状态
#[derive(Debug, Clone)]
pub struct CharacterResponse {
    pub index: usize,
    pub character: Character,
    pub has_portrait: bool,
}

impl CharacterResponse {
    pub fn from_book(book: &Book, index: usize) -> Option<Self> {
        book.character(index).map(|character| Self {
            index,
            character: character.clone(),
            has_portrait: book.portrait(index).is_some(),
        })
    }
}

/// 书籍详情
#[derive(Debug, Clone)]
pub struct BookDetailResponse {
    pub summary: BookSummaryResponse,
    pub book_type: String,
    pub genre: String,
    pub tone: String,
    pub description: String,
    pub outline: Vec<String>,
    pub chapters: Vec<ChapterResponse>,
    pub characters: Vec<CharacterResponse>,
    pub warnings: Vec<String>,
}

impl From<&Book> for BookDetailResponse {
    fn from(book: &Book) -> Self {
        let config = book.config();
        Self {
            summary: BookSummaryResponse::from(book),
            book_type: config.book_type().as_str().to_string(),
            genre: config.genre().to_string(),
            tone: config.tone().label().to_string(),
            description: config.description().to_string(),
            outline: book.outline().titles().to_vec(),
            chapters: book
                .chapters()
                .iter()
                .map(|c| ChapterResponse {
                    index: c.index(),
                    heading: c.heading(),
                    title: c.title().to_string(),
                    text: c.text().to_string(),
                    has_audio: c.has_audio(),
                    has_illustration: c.has_illustration(),
                })
                .collect(),
            characters: (0..book.characters().len())
                .filter_map(|index| CharacterResponse::from_book(book, index))
                .collect(),
            warnings: book.warnings().to_vec(),
        }
    }
}

/// 二进制文件响应
#[derive(Debug, Clone)]
pub struct FileResponse {
    pub filename: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// 图片响应：字节或外部地址
#[derive(Debug, Clone)]
pub enum ImageResponse {
    File(FileResponse),
    Url(String),
}

impl ImageResponse {
    /// 内联字节按文件头确定扩展名
    fn from_image(image: &ImageRef, stem: &str) -> Self {
        match image {
            ImageRef::Bytes(bytes) => {
                let kind = MediaKind::sniff_image(bytes);
                ImageResponse::File(FileResponse {
                    filename: format!("{}.{}", stem, kind.extension),
                    mime_type: kind.mime_type.to_string(),
                    data: bytes.clone(),
                })
            }
            ImageRef::Url(url) => ImageResponse::Url(url.clone()),
        }
    }
}

async fn load_book(
    repo: &Arc<dyn BookRepositoryPort>,
    book_id: uuid::Uuid,
) -> Result<Book, ApplicationError> {
    let id = BookId::from_uuid(book_id);
    repo.find_by_id(&id)
        .await?
        .ok_or_else(|| ApplicationError::not_found("Book", id))
}

/// 文件名中只保留字母数字
fn file_stem(book: &Book) -> String {
    let stem: String = book
        .title()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect::<String>()
        .split('_')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("_");
    if stem.is_empty() {
        "book".to_string()
    } else {
        stem
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GetBook Handler
pub struct GetBookHandler {
    book_repo: Arc<dyn BookRepositoryPort>,
}

impl GetBookHandler {
    pub fn new(book_repo: Arc<dyn BookRepositoryPort>) -> Self {
        Self { book_repo }
    }

    pub async fn handle(&self, query: GetBook) -> Result<BookDetailResponse, ApplicationError> {
        let book = load_book(&self.book_repo, query.book_id).await?;
        Ok(BookDetailResponse::from(&book))
    }
}

/// ListBooks Handler
pub struct ListBooksHandler {
    book_repo: Arc<dyn BookRepositoryPort>,
}

impl ListBooksHandler {
    pub fn new(book_repo: Arc<dyn BookRepositoryPort>) -> Self {
        Self { book_repo }
    }

    pub async fn handle(
        &self,
        _query: ListBooks,
    ) -> Result<Vec<BookSummaryResponse>, ApplicationError> {
        let books = self.book_repo.find_all().await?;
        Ok(books.iter().map(BookSummaryResponse::from).collect())
    }
}

/// ExportBook Handler
///
/// 根据格式选择已注册的序列化器
pub struct ExportBookHandler {
    book_repo: Arc<dyn BookRepositoryPort>,
    serializers: Vec<Arc<dyn BookSerializerPort>>,
}

impl ExportBookHandler {
    pub fn new(
        book_repo: Arc<dyn BookRepositoryPort>,
        serializers: Vec<Arc<dyn BookSerializerPort>>,
    ) -> Self {
        Self {
            book_repo,
            serializers,
        }
    }

    fn serializer(&self, format: ExportFormat) -> Option<&Arc<dyn BookSerializerPort>> {
        self.serializers.iter().find(|s| s.format() == format)
    }

    pub async fn handle(&self, query: ExportBook) -> Result<FileResponse, ApplicationError> {
        let serializer = self.serializer(query.format).ok_or_else(|| {
            ApplicationError::validation(format!("Export format not available: {}", query.format))
        })?;
        let book = load_book(&self.book_repo, query.book_id).await?;

        let data = serializer.serialize(&book)?;

        tracing::info!(
            book_id = %book.id(),
            format = %query.format,
            size = data.len(),
            "Book exported"
        );

        Ok(FileResponse {
            filename: format!("{}.{}", file_stem(&book), query.format.extension()),
            mime_type: query.format.mime_type().to_string(),
            data,
        })
    }
}

/// GetChapterAudio Handler
pub struct GetChapterAudioHandler {
    book_repo: Arc<dyn BookRepositoryPort>,
}

impl GetChapterAudioHandler {
    pub fn new(book_repo: Arc<dyn BookRepositoryPort>) -> Self {
        Self { book_repo }
    }

    pub async fn handle(&self, query: GetChapterAudio) -> Result<FileResponse, ApplicationError> {
        let book = load_book(&self.book_repo, query.book_id).await?;
        let chapter = book.chapter(query.chapter_index).ok_or_else(|| {
            ApplicationError::not_found("Chapter", format!("{}#{}", book.id(), query.chapter_index))
        })?;
        let audio = chapter.audio().ok_or_else(|| {
            ApplicationError::invalid_state(format!(
                "Chapter {} has no narration",
                chapter.number()
            ))
        })?;

        let kind = MediaKind::sniff_audio(audio);
        Ok(FileResponse {
            filename: format!("chapter_{}.{}", chapter.number(), kind.extension),
            mime_type: kind.mime_type.to_string(),
            data: audio.to_vec(),
        })
    }
}

/// GetCover Handler
pub struct GetCoverHandler {
    book_repo: Arc<dyn BookRepositoryPort>,
}

impl GetCoverHandler {
    pub fn new(book_repo: Arc<dyn BookRepositoryPort>) -> Self {
        Self { book_repo }
    }

    pub async fn handle(&self, query: GetCover) -> Result<ImageResponse, ApplicationError> {
        let book = load_book(&self.book_repo, query.book_id).await?;
        let cover = book
            .cover()
            .ok_or_else(|| ApplicationError::invalid_state("Book has no cover"))?;

        Ok(ImageResponse::from_image(cover.image(), "cover"))
    }
}

/// GetPortrait Handler
pub struct GetPortraitHandler {
    book_repo: Arc<dyn BookRepositoryPort>,
}

impl GetPortraitHandler {
    pub fn new(book_repo: Arc<dyn BookRepositoryPort>) -> Self {
        Self { book_repo }
    }

    pub async fn handle(&self, query: GetPortrait) -> Result<ImageResponse, ApplicationError> {
        let book = load_book(&self.book_repo, query.book_id).await?;
        if book.character(query.index).is_none() {
            return Err(ApplicationError::not_found(
                "Character",
                format!("{}#{}", book.id(), query.index),
            ));
        }
        let portrait = book.portrait(query.index).ok_or_else(|| {
            ApplicationError::invalid_state(format!("Character {} has no portrait", query.index))
        })?;

        Ok(ImageResponse::from_image(
            portrait,
            &format!("portrait_{}", query.index + 1),
        ))
    }
}

/// GetIllustration Handler
pub struct GetIllustrationHandler {
    book_repo: Arc<dyn BookRepositoryPort>,
}

impl GetIllustrationHandler {
    pub fn new(book_repo: Arc<dyn BookRepositoryPort>) -> Self {
        Self { book_repo }
    }

    pub async fn handle(&self, query: GetIllustration) -> Result<ImageResponse, ApplicationError> {
        let book = load_book(&self.book_repo, query.book_id).await?;
        let chapter = book.chapter(query.chapter_index).ok_or_else(|| {
            ApplicationError::not_found("Chapter", format!("{}#{}", book.id(), query.chapter_index))
        })?;
        let illustration = chapter.illustration().ok_or_else(|| {
            ApplicationError::invalid_state(format!(
                "Chapter {} has no illustration",
                chapter.number()
            ))
        })?;

        Ok(ImageResponse::from_image(
            illustration,
            &format!("illustration_{}", chapter.number()),
        ))
    }
}
