//! 应用层 - 查询（读操作）
//!
//! CQRS 查询侧：处理所有读操作

mod book_queries;
mod catalog_queries;
mod job_queries;

pub mod handlers;

pub use book_queries::*;
pub use catalog_queries::*;
pub use job_queries::*;
