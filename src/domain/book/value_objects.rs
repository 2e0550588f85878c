//! Book Context - Value Objects

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::BookError;

/// 章节数下限
pub const MIN_CHAPTERS: u32 = 3;
/// 章节数上限
pub const MAX_CHAPTERS: u32 = 20;

/// 书籍唯一标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookId(Uuid);

impl BookId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for BookId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BookId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 书籍类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookType {
    Fiction,
    NonFiction,
}

impl BookType {
    pub const ALL: [BookType; 2] = [BookType::Fiction, BookType::NonFiction];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookType::Fiction => "fiction",
            BookType::NonFiction => "non_fiction",
        }
    }

    /// 展示名（用于标题页副标题）
    pub fn label(&self) -> &'static str {
        match self {
            BookType::Fiction => "Fiction",
            BookType::NonFiction => "Non-Fiction",
        }
    }

    /// 该类型可选的题材列表
    pub fn genres(&self) -> &'static [&'static str] {
        match self {
            BookType::Fiction => FICTION_GENRES,
            BookType::NonFiction => NON_FICTION_GENRES,
        }
    }
}

impl std::fmt::Display for BookType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for BookType {
    type Err = BookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect();
        match normalized.as_str() {
            "fiction" => Ok(BookType::Fiction),
            "nonfiction" => Ok(BookType::NonFiction),
            _ => Err(BookError::UnknownBookType(s.to_string())),
        }
    }
}

const FICTION_GENRES: &[&str] = &[
    "Adventure",
    "Romance",
    "Sci-Fi",
    "Mystery",
    "Fantasy",
    "Horror",
    "Historical Fiction",
];

const NON_FICTION_GENRES: &[&str] = &[
    "Personal Development",
    "Business",
    "Memoir",
    "Self-Help",
    "Productivity",
    "Philosophy",
    "Psychology",
    "Self-Discipline",
    "Time Management",
    "Wealth Building",
    "Confidence",
    "Mindfulness",
    "Goal Setting",
    "Stoicism",
    "Creativity",
    "Fitness & Health",
    "Habits",
    "Social Skills",
    "Leadership",
    "Focus",
    "Decision-Making",
    "Public Speaking",
    "Mental Clarity",
];

/// 题材
///
/// 不变量: 必须属于对应书籍类型的固定列表，保存规范拼写
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre(String);

impl Genre {
    pub fn new(book_type: BookType, genre: &str) -> Result<Self, BookError> {
        let wanted = genre.trim();
        book_type
            .genres()
            .iter()
            .find(|candidate| candidate.eq_ignore_ascii_case(wanted))
            .map(|canonical| Self(canonical.to_string()))
            .ok_or_else(|| BookError::UnknownGenre {
                book_type,
                genre: genre.to_string(),
            })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Genre {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 写作语气
///
/// 每个语气对应一段固定的描述短语，插入到生成提示词中
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Tone {
    #[default]
    Default,
    Romantic,
    Wholesome,
    Suspenseful,
    Philosophical,
    Motivational,
    Educational,
    Satirical,
    Professional,
    Instructive,
    Authoritative,
    Conversational,
    Reflective,
}

impl Tone {
    pub const ALL: [Tone; 13] = [
        Tone::Default,
        Tone::Romantic,
        Tone::Wholesome,
        Tone::Suspenseful,
        Tone::Philosophical,
        Tone::Motivational,
        Tone::Educational,
        Tone::Satirical,
        Tone::Professional,
        Tone::Instructive,
        Tone::Authoritative,
        Tone::Conversational,
        Tone::Reflective,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Tone::Default => "Default",
            Tone::Romantic => "Romantic",
            Tone::Wholesome => "Wholesome",
            Tone::Suspenseful => "Suspenseful",
            Tone::Philosophical => "Philosophical",
            Tone::Motivational => "Motivational",
            Tone::Educational => "Educational",
            Tone::Satirical => "Satirical",
            Tone::Professional => "Professional",
            Tone::Instructive => "Instructive",
            Tone::Authoritative => "Authoritative",
            Tone::Conversational => "Conversational",
            Tone::Reflective => "Reflective",
        }
    }

    /// 语气描述短语
    pub fn phrase(&self) -> &'static str {
        match self {
            Tone::Default => "engaging, vivid, well-paced",
            Tone::Romantic => "sensual, romantic, literary",
            Tone::Wholesome => "uplifting, warm, feel-good",
            Tone::Suspenseful => "tense, thrilling, page-turning",
            Tone::Philosophical => "deep, reflective, thoughtful",
            Tone::Motivational => "inspirational, personal growth, powerful",
            Tone::Educational => "insightful, informative, structured",
            Tone::Satirical => "humorous, ironic, critical",
            Tone::Professional => "formal, business-like, articulate",
            Tone::Instructive => "clear, structured, motivational",
            Tone::Authoritative => "firm, knowledgeable, professional",
            Tone::Conversational => "relatable, friendly, informal",
            Tone::Reflective => "thoughtful, introspective, wise",
        }
    }
}

impl std::fmt::Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for Tone {
    type Err = BookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        if wanted.is_empty() {
            return Ok(Tone::Default);
        }
        Tone::ALL
            .iter()
            .copied()
            .find(|tone| tone.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| BookError::UnknownTone(s.to_string()))
    }
}

/// 章节数（3..=20）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterCount(u32);

impl ChapterCount {
    pub fn new(count: u32) -> Result<Self, BookError> {
        if !(MIN_CHAPTERS..=MAX_CHAPTERS).contains(&count) {
            return Err(BookError::InvalidChapterCount(count));
        }
        Ok(Self(count))
    }

    pub fn get(&self) -> u32 {
        self.0
    }

    pub fn as_usize(&self) -> usize {
        self.0 as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_type_parsing() {
        assert_eq!("Fiction".parse::<BookType>().unwrap(), BookType::Fiction);
        assert_eq!("non-fiction".parse::<BookType>().unwrap(), BookType::NonFiction);
        assert_eq!("NonFiction".parse::<BookType>().unwrap(), BookType::NonFiction);
        assert!("poetry".parse::<BookType>().is_err());
    }

    #[test]
    fn test_genre_is_canonicalized() {
        let genre = Genre::new(BookType::Fiction, "  fantasy ").unwrap();
        assert_eq!(genre.as_str(), "Fantasy");
    }

    #[test]
    fn test_genre_must_match_book_type() {
        assert!(Genre::new(BookType::NonFiction, "Fantasy").is_err());
        assert!(Genre::new(BookType::NonFiction, "stoicism").is_ok());
    }

    #[test]
    fn test_tone_phrase_table() {
        assert_eq!(Tone::Suspenseful.phrase(), "tense, thrilling, page-turning");
        assert_eq!("".parse::<Tone>().unwrap(), Tone::Default);
        assert_eq!("reflective".parse::<Tone>().unwrap(), Tone::Reflective);
        assert!("grim".parse::<Tone>().is_err());
    }

    #[test]
    fn test_chapter_count_bounds() {
        assert!(ChapterCount::new(2).is_err());
        assert!(ChapterCount::new(3).is_ok());
        assert!(ChapterCount::new(20).is_ok());
        assert!(ChapterCount::new(21).is_err());
    }
}
