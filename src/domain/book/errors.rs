//! Book Context - Errors

use thiserror::Error;

use super::BookType;

#[derive(Debug, Error)]
pub enum BookError {
    #[error("Chapter count must be between 3 and 20, got {0}")]
    InvalidChapterCount(u32),

    #[error("Unknown book type: {0}")]
    UnknownBookType(String),

    #[error("Unknown genre for {book_type}: {genre}")]
    UnknownGenre { book_type: BookType, genre: String },

    #[error("Unknown tone: {0}")]
    UnknownTone(String),

    #[error("Title too long: {0} characters (max 200)")]
    TitleTooLong(usize),

    #[error("Inconsistent book: {0}")]
    InconsistentChapters(String),

    #[error("Character index {index} out of range ({count} characters)")]
    CharacterOutOfRange { index: usize, count: usize },
}
