//! Sled 存储实现

mod book_repo;
mod narration_cache;

pub use book_repo::SledBookRepository;
pub use narration_cache::SledNarrationCache;
