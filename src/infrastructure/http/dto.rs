//! Data Transfer Objects

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::{
    BookDetailResponse, BookSummaryResponse, CatalogResponse, CharacterResponse,
    GenerateBookResponse, JobStatusResponse,
};
use crate::domain::book::Character;

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

/// 空数据响应
#[derive(Debug, Serialize, Deserialize)]
pub struct Empty {}

impl ApiResponse<Empty> {
    /// 成功但无数据
    pub fn ok() -> Self {
        Self::success(Empty {})
    }
}

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct GenerateBookRequest {
    pub book_type: String,
    pub genre: String,
    #[serde(default)]
    pub tone: Option<String>,
    pub chapter_count: u32,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct JobStatusRequest {
    pub job_id: String,
}

/// 只携带书籍 id 的请求（get / delete / cover）
#[derive(Debug, Deserialize)]
pub struct BookIdRequest {
    pub id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ExportBookRequest {
    pub id: Uuid,
    pub format: String,
}

/// 章节音频 / 插图请求
#[derive(Debug, Deserialize)]
pub struct ChapterRequest {
    pub id: Uuid,
    /// 章节序号（0 起）
    pub chapter: usize,
}

/// 角色相关请求（重新生成、肖像）
#[derive(Debug, Deserialize)]
pub struct CharacterRequest {
    pub id: Uuid,
    /// 角色序号（0 起）
    pub index: usize,
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateBookDto {
    pub job_id: String,
    pub status: String,
    pub title: String,
    pub chapter_count: usize,
}

impl From<GenerateBookResponse> for GenerateBookDto {
    fn from(r: GenerateBookResponse) -> Self {
        Self {
            job_id: r.job_id,
            status: r.state.as_str().to_string(),
            title: r.title,
            chapter_count: r.chapter_count,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JobStatusDto {
    pub job_id: String,
    pub status: String,
    pub stage: String,
    pub progress: f32,
    pub title: String,
    pub book_id: Option<String>,
    pub error: Option<String>,
    pub warnings: Vec<String>,
    pub created_at: String,
    pub completed_at: Option<String>,
}

impl From<JobStatusResponse> for JobStatusDto {
    fn from(r: JobStatusResponse) -> Self {
        Self {
            job_id: r.job_id,
            status: r.state.as_str().to_string(),
            stage: r.stage.as_str().to_string(),
            progress: r.progress,
            title: r.title,
            book_id: r.book_id,
            error: r.error,
            warnings: r.warnings,
            created_at: r.created_at.to_rfc3339(),
            completed_at: r.completed_at.map(|t| t.to_rfc3339()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BookSummaryDto {
    pub id: String,
    pub title: String,
    pub subtitle: String,
    pub chapter_count: usize,
    pub narrated_chapters: usize,
    pub has_cover: bool,
    pub created_at: String,
}

impl From<BookSummaryResponse> for BookSummaryDto {
    fn from(r: BookSummaryResponse) -> Self {
        Self {
            id: r.id,
            title: r.title,
            subtitle: r.subtitle,
            chapter_count: r.chapter_count,
            narrated_chapters: r.narrated_chapters,
            has_cover: r.has_cover,
            created_at: r.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChapterDto {
    pub index: usize,
    pub heading: String,
    pub title: String,
    pub text: String,
    pub has_audio: bool,
    pub has_illustration: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CharacterDto {
    pub index: usize,
    #[serde(flatten)]
    pub character: Character,
    pub has_portrait: bool,
}

impl From<CharacterResponse> for CharacterDto {
    fn from(r: CharacterResponse) -> Self {
        Self {
            index: r.index,
            character: r.character,
            has_portrait: r.has_portrait,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BookDetailDto {
    #[serde(flatten)]
    pub summary: BookSummaryDto,
    pub book_type: String,
    pub genre: String,
    pub tone: String,
    pub description: String,
    pub outline: Vec<String>,
    pub chapters: Vec<ChapterDto>,
    pub characters: Vec<CharacterDto>,
    pub warnings: Vec<String>,
}

impl From<BookDetailResponse> for BookDetailDto {
    fn from(r: BookDetailResponse) -> Self {
        Self {
            summary: r.summary.into(),
            book_type: r.book_type,
            genre: r.genre,
            tone: r.tone,
            description: r.description,
            outline: r.outline,
            chapters: r
                .chapters
                .into_iter()
                .map(|c| ChapterDto {
                    index: c.index,
                    heading: c.heading,
                    title: c.title,
                    text: c.text,
                    has_audio: c.has_audio,
                    has_illustration: c.has_illustration,
                })
                .collect(),
            characters: r.characters.into_iter().map(CharacterDto::from).collect(),
            warnings: r.warnings,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BookTypeDto {
    pub id: &'static str,
    pub label: &'static str,
    pub genres: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct ToneDto {
    pub label: &'static str,
    pub phrase: &'static str,
}

#[derive(Debug, Serialize)]
pub struct CatalogDto {
    pub book_types: Vec<BookTypeDto>,
    pub tones: Vec<ToneDto>,
    pub min_chapters: u32,
    pub max_chapters: u32,
    pub export_formats: Vec<&'static str>,
}

impl CatalogDto {
    pub fn new(catalog: CatalogResponse, export_formats: Vec<&'static str>) -> Self {
        Self {
            book_types: catalog
                .book_types
                .into_iter()
                .map(|t| BookTypeDto {
                    id: t.id,
                    label: t.label,
                    genres: t.genres,
                })
                .collect(),
            tones: catalog
                .tones
                .into_iter()
                .map(|t| ToneDto {
                    label: t.label,
                    phrase: t.phrase,
                })
                .collect(),
            min_chapters: catalog.min_chapters,
            max_chapters: catalog.max_chapters,
            export_formats,
        }
    }
}
