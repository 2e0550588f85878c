//! Domain Layer - 领域层
//!
//! - Book Context: 书籍配置、聚合与章节
//! - Outline: 大纲解析

pub mod book;

mod outline;

pub use outline::Outline;
