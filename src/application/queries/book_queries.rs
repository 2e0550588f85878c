//! Book Queries

use uuid::Uuid;

use crate::application::ports::ExportFormat;

/// 获取书籍详情查询
#[derive(Debug, Clone)]
pub struct GetBook {
    pub book_id: Uuid,
}

/// 列出所有书籍查询
#[derive(Debug, Clone)]
pub struct ListBooks;

/// 导出书籍查询
#[derive(Debug, Clone)]
pub struct ExportBook {
    pub book_id: Uuid,
    pub format: ExportFormat,
}

/// 获取章节朗读音频查询
#[derive(Debug, Clone)]
pub struct GetChapterAudio {
    pub book_id: Uuid,
    /// 章节序号（0 起）
    pub chapter_index: usize,
}

/// 获取封面查询
#[derive(Debug, Clone)]
pub struct GetCover {
    pub book_id: Uuid,
}

/// 获取角色肖像查询
#[derive(Debug, Clone)]
pub struct GetPortrait {
    pub book_id: Uuid,
    pub index: usize,
}

/// 获取章节插图查询
#[derive(Debug, Clone)]
pub struct GetIllustration {
    pub book_id: Uuid,
    pub chapter_index: usize,
}
