//! Catalog Queries

/// 获取可选书籍类型、题材和语气
#[derive(Debug, Clone)]
pub struct GetCatalog;
