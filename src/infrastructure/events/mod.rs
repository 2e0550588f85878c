//! Events - 生成进度事件推送

mod publisher;

pub use publisher::{EventPublisher, WsEvent};
