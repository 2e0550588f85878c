//! Narration Cache Port - 朗读音频缓存
//!
//! 相同文本 + 语言只合成一次

use async_trait::async_trait;
use thiserror::Error;

/// 缓存错误
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Narration Cache Port
#[async_trait]
pub trait NarrationCachePort: Send + Sync {
    async fn get(&self, cache_key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    async fn put(&self, cache_key: &str, audio: &[u8]) -> Result<(), CacheError>;
}

/// 生成缓存 key
///
/// 使用 md5(text) + lang 作为缓存 key
pub fn generate_cache_key(text: &str, lang: &str) -> String {
    let digest = md5::compute(text.as_bytes());
    format!("{:x}:{}", digest, lang)
}
