//! Sled Book Repository
//!
//! 书籍以 bincode 编码整体存储，key 为 `book:{uuid}`

use async_trait::async_trait;
use sled::Db;
use std::path::Path;
use std::sync::Arc;

use crate::application::ports::{BookRepositoryPort, RepositoryError};
use crate::domain::book::{Book, BookId};

const PREFIX: &str = "book:";

fn book_key(id: &BookId) -> String {
    format!("{}{}", PREFIX, id)
}

/// Sled 书籍仓储
pub struct SledBookRepository {
    db: Db,
}

impl SledBookRepository {
    /// 打开（或创建）数据库
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        let db = sled::open(path.as_ref()).map_err(|e| RepositoryError::Database(e.to_string()))?;

        tracing::info!(
            db_path = %path.as_ref().display(),
            books = db.scan_prefix(PREFIX).count(),
            "SledBookRepository initialized"
        );

        Ok(Self { db })
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn flush(&self) -> Result<(), RepositoryError> {
        self.db
            .flush()
            .map_err(|e| RepositoryError::Database(e.to_string()))?;
        Ok(())
    }

    fn decode(data: &[u8]) -> Result<Book, RepositoryError> {
        bincode::deserialize(data).map_err(|e| RepositoryError::Serialization(e.to_string()))
    }
}

#[async_trait]
impl BookRepositoryPort for SledBookRepository {
    async fn save(&self, book: &Book) -> Result<(), RepositoryError> {
        let bytes =
            bincode::serialize(book).map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        let size = bytes.len();

        self.db
            .insert(book_key(book.id()), bytes)
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        tracing::debug!(book_id = %book.id(), size_bytes = size, "Book saved");
        Ok(())
    }

    async fn find_by_id(&self, id: &BookId) -> Result<Option<Book>, RepositoryError> {
        match self.db.get(book_key(id)) {
            Ok(Some(data)) => Ok(Some(Self::decode(&data)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(RepositoryError::Database(e.to_string())),
        }
    }

    async fn find_all(&self) -> Result<Vec<Book>, RepositoryError> {
        let mut books = Vec::new();
        for item in self.db.scan_prefix(PREFIX) {
            let (_, value) = item.map_err(|e| RepositoryError::Database(e.to_string()))?;
            books.push(Self::decode(&value)?);
        }
        books.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(books)
    }

    async fn delete(&self, id: &BookId) -> Result<bool, RepositoryError> {
        let removed = self
            .db
            .remove(book_key(id))
            .map_err(|e| RepositoryError::Database(e.to_string()))?;
        Ok(removed.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    use crate::domain::book::{BookConfig, BookType, Chapter, CoverImage, ImageRef, Tone};
    use crate::domain::Outline;

    fn book(title: &str) -> Book {
        let config = BookConfig::new(
            BookType::Fiction,
            "Mystery",
            Tone::Suspenseful,
            3,
            Some(title.to_string()),
            None,
        )
        .unwrap();
        let titles = vec!["One".to_string(), "Two".to_string(), "Three".to_string()];
        let chapters = titles
            .iter()
            .enumerate()
            .map(|(i, t)| Chapter::new(i, t.clone(), format!("Text of {}.", t)))
            .collect();
        let cover = CoverImage::new(ImageRef::Bytes(vec![0x89, b'P', b'N', b'G']), "cover");
        Book::assemble(
            config,
            Outline::from_titles(titles),
            chapters,
            Some(cover),
            Vec::new(),
            vec!["narration skipped".into()],
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_save_and_find() {
        let dir = tempdir().unwrap();
        let repo = SledBookRepository::open(dir.path()).unwrap();
        let original = book("Whodunit");

        repo.save(&original).await.unwrap();

        let loaded = repo.find_by_id(&original.id()).await.unwrap().unwrap();
        assert_eq!(loaded.id(), original.id());
        assert_eq!(loaded.title(), "Whodunit");
        assert_eq!(loaded.chapters().len(), 3);
        assert_eq!(loaded.chapter(1).unwrap().text(), "Text of Two.");
        assert_eq!(loaded.warnings(), original.warnings());
        assert!(loaded.cover().unwrap().image().bytes().is_some());
    }

    #[tokio::test]
    async fn test_find_all_newest_first_and_delete() {
        let dir = tempdir().unwrap();
        let repo = SledBookRepository::open(dir.path()).unwrap();

        let first = book("First");
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = book("Second");
        repo.save(&first).await.unwrap();
        repo.save(&second).await.unwrap();

        let titles: Vec<String> = repo
            .find_all()
            .await
            .unwrap()
            .iter()
            .map(|b| b.title().to_string())
            .collect();
        assert_eq!(titles, vec!["Second", "First"]);

        assert!(repo.delete(&first.id()).await.unwrap());
        assert!(!repo.delete(&first.id()).await.unwrap());
        assert!(repo.find_by_id(&first.id()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_books_survive_reopen() {
        let dir = tempdir().unwrap();
        let saved = book("Persistent");
        {
            let repo = SledBookRepository::open(dir.path()).unwrap();
            repo.save(&saved).await.unwrap();
            repo.flush().unwrap();
        }

        let repo = SledBookRepository::open(dir.path()).unwrap();
        assert!(repo.find_by_id(&saved.id()).await.unwrap().is_some());
    }
}
