//! Book Context - 生成配置

use serde::{Deserialize, Serialize};

use super::{BookError, BookType, ChapterCount, Genre, Tone};

/// 未提供标题时使用的默认标题
pub const UNTITLED: &str = "Untitled";

/// 书籍生成配置
///
/// 不变量:
/// - 生成开始后不可变（只暴露 getter）
/// - genre 属于 book_type 的固定列表
/// - chapter_count 在 3..=20 之间
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookConfig {
    book_type: BookType,
    genre: Genre,
    tone: Tone,
    title: String,
    description: String,
    chapter_count: ChapterCount,
}

impl BookConfig {
    pub fn new(
        book_type: BookType,
        genre: &str,
        tone: Tone,
        chapter_count: u32,
        title: Option<String>,
        description: Option<String>,
    ) -> Result<Self, BookError> {
        let genre = Genre::new(book_type, genre)?;
        let chapter_count = ChapterCount::new(chapter_count)?;

        let title = title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| UNTITLED.to_string());
        let title_len = title.chars().count();
        if title_len > 200 {
            return Err(BookError::TitleTooLong(title_len));
        }

        let description = description
            .map(|d| d.trim().to_string())
            .unwrap_or_default();

        Ok(Self {
            book_type,
            genre,
            tone,
            title,
            description,
            chapter_count,
        })
    }

    pub fn book_type(&self) -> BookType {
        self.book_type
    }

    pub fn genre(&self) -> &Genre {
        &self.genre
    }

    pub fn tone(&self) -> Tone {
        self.tone
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// 原始描述（可能为空）
    pub fn description(&self) -> &str {
        &self.description
    }

    /// 提示词中使用的描述：描述为空时以标题代替
    pub fn effective_description(&self) -> &str {
        if self.description.is_empty() {
            &self.title
        } else {
            &self.description
        }
    }

    pub fn chapter_count(&self) -> usize {
        self.chapter_count.as_usize()
    }

    /// 标题页副标题: "{type} - {genre} ({tone} tone)"
    pub fn subtitle(&self) -> String {
        format!(
            "{} - {} ({} tone)",
            self.book_type.label(),
            self.genre,
            self.tone.label()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fantasy(title: Option<&str>, description: Option<&str>) -> BookConfig {
        BookConfig::new(
            BookType::Fiction,
            "Fantasy",
            Tone::Default,
            3,
            title.map(String::from),
            description.map(String::from),
        )
        .unwrap()
    }

    #[test]
    fn test_description_falls_back_to_title() {
        let config = fantasy(Some("The Enchanted Forest"), Some("   "));
        assert_eq!(config.description(), "");
        assert_eq!(config.effective_description(), "The Enchanted Forest");
    }

    #[test]
    fn test_missing_title_uses_default() {
        let config = fantasy(None, Some("A tale."));
        assert_eq!(config.title(), UNTITLED);
        assert_eq!(config.effective_description(), "A tale.");
    }

    #[test]
    fn test_subtitle_format() {
        let config = fantasy(Some("The Enchanted Forest"), None);
        assert_eq!(config.subtitle(), "Fiction - Fantasy (Default tone)");
    }

    #[test]
    fn test_invalid_chapter_count_rejected() {
        let result = BookConfig::new(BookType::Fiction, "Fantasy", Tone::Default, 21, None, None);
        assert!(matches!(result, Err(BookError::InvalidChapterCount(21))));
    }

    #[test]
    fn test_overlong_title_rejected() {
        let title = "x".repeat(201);
        let result =
            BookConfig::new(BookType::Fiction, "Fantasy", Tone::Default, 3, Some(title), None);
        assert!(matches!(result, Err(BookError::TitleTooLong(201))));
    }
}
