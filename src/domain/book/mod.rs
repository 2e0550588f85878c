//! Book Context - 书籍限界上下文
//!
//! 职责:
//! - 生成配置（类型、题材、语气、章节数）
//! - Book 聚合与章节实体
//! - 封面、插图、角色与肖像

mod aggregate;
mod book_config;
mod entities;
mod errors;
mod media;
mod value_objects;

pub use aggregate::Book;
pub use book_config::{BookConfig, UNTITLED};
pub use entities::{Chapter, Character, CoverImage, ImageRef};
pub use errors::BookError;
pub use media::MediaKind;
pub use value_objects::{
    BookId, BookType, ChapterCount, Genre, Tone, MAX_CHAPTERS, MIN_CHAPTERS,
};
