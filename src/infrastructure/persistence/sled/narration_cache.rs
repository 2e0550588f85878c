//! Sled Narration Cache Implementation

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sled::Db;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::application::ports::{CacheError, NarrationCachePort};

/// 内部缓存条目
#[derive(Debug, Clone, Serialize, Deserialize)]
struct NarrationEntry {
    audio: Vec<u8>,
    created_at: i64,
}

/// Sled 朗读缓存
pub struct SledNarrationCache {
    db: Db,
    hit_count: AtomicU64,
    miss_count: AtomicU64,
}

impl SledNarrationCache {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, CacheError> {
        let db =
            sled::open(path.as_ref()).map_err(|e| CacheError::DatabaseError(e.to_string()))?;

        tracing::info!(
            db_path = %path.as_ref().display(),
            entries = db.scan_prefix("narration:").count(),
            "SledNarrationCache initialized"
        );

        Ok(Self {
            db,
            hit_count: AtomicU64::new(0),
            miss_count: AtomicU64::new(0),
        })
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// (hit, miss)
    pub fn stats(&self) -> (u64, u64) {
        (
            self.hit_count.load(Ordering::Relaxed),
            self.miss_count.load(Ordering::Relaxed),
        )
    }
}

#[async_trait]
impl NarrationCachePort for SledNarrationCache {
    async fn get(&self, cache_key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let key = format!("narration:{}", cache_key);

        match self.db.get(&key) {
            Ok(Some(data)) => {
                let entry: NarrationEntry = bincode::deserialize(&data)
                    .map_err(|e| CacheError::SerializationError(e.to_string()))?;
                self.hit_count.fetch_add(1, Ordering::Relaxed);
                Ok(Some(entry.audio))
            }
            Ok(None) => {
                self.miss_count.fetch_add(1, Ordering::Relaxed);
                Ok(None)
            }
            Err(e) => Err(CacheError::DatabaseError(e.to_string())),
        }
    }

    async fn put(&self, cache_key: &str, audio: &[u8]) -> Result<(), CacheError> {
        let entry = NarrationEntry {
            audio: audio.to_vec(),
            created_at: Utc::now().timestamp(),
        };
        let bytes =
            bincode::serialize(&entry).map_err(|e| CacheError::SerializationError(e.to_string()))?;

        self.db
            .insert(format!("narration:{}", cache_key), bytes)
            .map_err(|e| CacheError::DatabaseError(e.to_string()))?;

        tracing::debug!(
            cache_key = %cache_key,
            size_bytes = audio.len(),
            "Narration cached"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::generate_cache_key;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_cache_put_get() {
        let dir = tempdir().unwrap();
        let cache = SledNarrationCache::open(dir.path()).unwrap();
        let key = generate_cache_key("Once upon a time.", "en");

        assert!(cache.get(&key).await.unwrap().is_none());
        cache.put(&key, &[1, 2, 3]).await.unwrap();
        assert_eq!(cache.get(&key).await.unwrap(), Some(vec![1, 2, 3]));

        assert_eq!(cache.stats(), (1, 1));
    }

    #[tokio::test]
    async fn test_overwrite_replaces_audio() {
        let dir = tempdir().unwrap();
        let cache = SledNarrationCache::open(dir.path()).unwrap();

        cache.put("k", b"old").await.unwrap();
        cache.put("k", b"new").await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some(b"new".to_vec()));
    }
}
