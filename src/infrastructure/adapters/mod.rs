//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现

pub mod export;
pub mod image;
pub mod retry;
pub mod speech;
pub mod text;

pub use retry::RetryPolicy;
