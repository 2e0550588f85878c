//! HTTP Handlers

mod book;
mod catalog;
mod files;
mod job;
mod ping;
mod websocket;

pub use book::*;
pub use catalog::*;
pub use files::*;
pub use job::*;
pub use ping::*;
pub use websocket::*;
