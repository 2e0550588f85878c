//! Book Context - Aggregate Root

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BookConfig, BookError, BookId, Chapter, Character, CoverImage, ImageRef};
use crate::domain::Outline;

/// Book 聚合根
///
/// 不变量:
/// - chapters.len() == outline.len()
/// - 章节 index 严格为 0..len，按顺序排列
/// - 组装后章节、大纲、封面不可变，章节归 Book 独占
/// - portraits.len() == characters.len()，替换角色时清除其肖像
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    id: BookId,
    config: BookConfig,
    outline: Outline,
    chapters: Vec<Chapter>,
    cover: Option<CoverImage>,
    characters: Vec<Character>,
    portraits: Vec<Option<ImageRef>>,
    warnings: Vec<String>,
    created_at: DateTime<Utc>,
}

impl Book {
    /// 组装书籍，校验章节与大纲一致
    pub fn assemble(
        config: BookConfig,
        outline: Outline,
        chapters: Vec<Chapter>,
        cover: Option<CoverImage>,
        characters: Vec<Character>,
        warnings: Vec<String>,
    ) -> Result<Self, BookError> {
        if chapters.len() != outline.len() {
            return Err(BookError::InconsistentChapters(format!(
                "{} chapters for an outline of {}",
                chapters.len(),
                outline.len()
            )));
        }

        if let Some((position, chapter)) = chapters
            .iter()
            .enumerate()
            .find(|(position, chapter)| chapter.index() != *position)
        {
            return Err(BookError::InconsistentChapters(format!(
                "chapter at position {} has index {}",
                position,
                chapter.index()
            )));
        }

        Ok(Self {
            id: BookId::new(),
            config,
            outline,
            chapters,
            cover,
            portraits: vec![None; characters.len()],
            characters,
            warnings,
            created_at: Utc::now(),
        })
    }

    // Getters
    pub fn id(&self) -> &BookId {
        &self.id
    }

    pub fn config(&self) -> &BookConfig {
        &self.config
    }

    pub fn title(&self) -> &str {
        self.config.title()
    }

    pub fn subtitle(&self) -> String {
        self.config.subtitle()
    }

    pub fn outline(&self) -> &Outline {
        &self.outline
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn chapter(&self, index: usize) -> Option<&Chapter> {
        self.chapters.get(index)
    }

    pub fn cover(&self) -> Option<&CoverImage> {
        self.cover.as_ref()
    }

    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    pub fn character(&self, index: usize) -> Option<&Character> {
        self.characters.get(index)
    }

    pub fn portrait(&self, index: usize) -> Option<&ImageRef> {
        self.portraits.get(index).and_then(Option::as_ref)
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn narrated_chapter_count(&self) -> usize {
        self.chapters.iter().filter(|c| c.has_audio()).count()
    }

    pub fn illustrated_chapter_count(&self) -> usize {
        self.chapters.iter().filter(|c| c.has_illustration()).count()
    }

    fn check_character(&self, index: usize) -> Result<(), BookError> {
        if index < self.characters.len() {
            Ok(())
        } else {
            Err(BookError::CharacterOutOfRange {
                index,
                count: self.characters.len(),
            })
        }
    }

    /// 替换角色，旧肖像随之失效
    pub fn replace_character(
        &mut self,
        index: usize,
        character: Character,
    ) -> Result<(), BookError> {
        self.check_character(index)?;
        self.characters[index] = character;
        self.portraits[index] = None;
        Ok(())
    }

    pub fn set_portrait(&mut self, index: usize, portrait: ImageRef) -> Result<(), BookError> {
        self.check_character(index)?;
        self.portraits[index] = Some(portrait);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::book::{BookType, Tone};

    fn config() -> BookConfig {
        BookConfig::new(
            BookType::Fiction,
            "Fantasy",
            Tone::Default,
            3,
            Some("The Enchanted Forest".into()),
            None,
        )
        .unwrap()
    }

    fn outline() -> Outline {
        Outline::parse("1. The Call\n2. Into the Woods\n3. The Return", 3)
    }

    fn chapters() -> Vec<Chapter> {
        outline()
            .titles()
            .iter()
            .enumerate()
            .map(|(i, t)| Chapter::new(i, t.clone(), format!("Text {}", i)))
            .collect()
    }

    #[test]
    fn test_assemble_consistent_book() {
        let book = Book::assemble(config(), outline(), chapters(), None, vec![], vec![]).unwrap();
        assert_eq!(book.chapters().len(), book.outline().len());
        for (i, chapter) in book.chapters().iter().enumerate() {
            assert_eq!(chapter.index(), i);
        }
        assert!(book.cover().is_none());
    }

    #[test]
    fn test_assemble_rejects_missing_chapter() {
        let mut chapters = chapters();
        chapters.pop();
        let result = Book::assemble(config(), outline(), chapters, None, vec![], vec![]);
        assert!(matches!(result, Err(BookError::InconsistentChapters(_))));
    }

    #[test]
    fn test_replacing_character_clears_its_portrait() {
        let characters = vec![
            Character {
                name: "Lily".into(),
                ..Default::default()
            },
            Character {
                name: "Oakheart".into(),
                ..Default::default()
            },
        ];
        let mut book =
            Book::assemble(config(), outline(), chapters(), None, characters, vec![]).unwrap();
        assert!(book.portrait(0).is_none());

        book.set_portrait(0, ImageRef::Url("http://x/lily.png".into())).unwrap();
        book.set_portrait(1, ImageRef::Bytes(vec![1, 2, 3])).unwrap();
        assert_eq!(book.portrait(0).and_then(ImageRef::url), Some("http://x/lily.png"));

        let rewritten = Character {
            name: "Rose".into(),
            ..Default::default()
        };
        book.replace_character(0, rewritten).unwrap();
        assert_eq!(book.character(0).map(|c| c.name.as_str()), Some("Rose"));
        assert!(book.portrait(0).is_none());
        assert!(book.portrait(1).is_some());

        assert!(matches!(
            book.set_portrait(2, ImageRef::Bytes(vec![])),
            Err(BookError::CharacterOutOfRange { index: 2, count: 2 })
        ));
    }

    #[test]
    fn test_assemble_rejects_reindexed_chapters() {
        let mut chapters = chapters();
        chapters.swap(0, 1);
        let result = Book::assemble(config(), outline(), chapters, None, vec![], vec![]);
        assert!(matches!(result, Err(BookError::InconsistentChapters(_))));
    }
}
