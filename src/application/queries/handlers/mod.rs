//! Query Handlers 实现
//!
//! 所有 QueryHandler 的具体实现

mod book_handlers;
mod catalog_handlers;
mod job_handlers;

pub use book_handlers::*;
pub use catalog_handlers::*;
pub use job_handlers::*;
