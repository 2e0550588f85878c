//! Persistence Layer - 数据持久化
//!
//! 书籍与朗读缓存都存储在 Sled 中

pub mod sled;

pub use self::sled::{SledBookRepository, SledNarrationCache};
