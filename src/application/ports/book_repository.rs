//! Book Repository Port - 书籍持久化

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::book::{Book, BookId};

/// 仓储错误
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Database error: {0}")]
    Database(String),
}

/// Book Repository Port
#[async_trait]
pub trait BookRepositoryPort: Send + Sync {
    /// 保存书籍（覆盖同 id）
    async fn save(&self, book: &Book) -> Result<(), RepositoryError>;

    /// 根据 id 查找
    async fn find_by_id(&self, id: &BookId) -> Result<Option<Book>, RepositoryError>;

    /// 列出所有书籍，按创建时间倒序
    async fn find_all(&self) -> Result<Vec<Book>, RepositoryError>;

    /// 删除书籍，返回是否存在
    async fn delete(&self, id: &BookId) -> Result<bool, RepositoryError>;
}
