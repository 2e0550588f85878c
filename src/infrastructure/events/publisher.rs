//! Event Publisher Implementation
//!
//! WebSocket 事件推送实现

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::application::pipeline::PipelineStage;

const CHANNEL_CAPACITY: usize = 100;

/// WebSocket 事件类型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum WsEvent {
    /// 阶段或进度变化
    JobProgress {
        job_id: String,
        stage: PipelineStage,
        progress: f32,
        #[serde(skip_serializing_if = "Option::is_none")]
        chapter_index: Option<usize>,
        message: String,
    },
    /// 非致命警告
    JobWarning { job_id: String, message: String },
    /// 书籍生成完成
    JobCompleted {
        job_id: String,
        book_id: Uuid,
        title: String,
    },
    /// 书籍生成失败
    JobFailed {
        job_id: String,
        stage: PipelineStage,
        error: String,
    },
    /// 书籍已删除
    BookDeleted { book_id: Uuid },
    /// 角色或肖像已更新
    BookUpdated { book_id: Uuid },
}

impl WsEvent {
    pub fn job_id(&self) -> Option<&str> {
        match self {
            WsEvent::JobProgress { job_id, .. }
            | WsEvent::JobWarning { job_id, .. }
            | WsEvent::JobCompleted { job_id, .. }
            | WsEvent::JobFailed { job_id, .. } => Some(job_id),
            WsEvent::BookDeleted { .. } | WsEvent::BookUpdated { .. } => None,
        }
    }
}

/// 事件发布器
///
/// 所有事件都进入全局通道，任务相关事件同时进入该任务的通道
pub struct EventPublisher {
    /// job_id -> broadcast sender
    job_channels: DashMap<String, broadcast::Sender<WsEvent>>,
    global_channel: broadcast::Sender<WsEvent>,
}

impl EventPublisher {
    pub fn new() -> Self {
        let (global_tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            job_channels: DashMap::new(),
            global_channel: global_tx,
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 订阅全部事件
    pub fn subscribe(&self) -> broadcast::Receiver<WsEvent> {
        self.global_channel.subscribe()
    }

    /// 订阅单个任务的事件
    pub fn subscribe_job(&self, job_id: &str) -> broadcast::Receiver<WsEvent> {
        self.job_channels
            .entry(job_id.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    pub fn publish_progress(
        &self,
        job_id: &str,
        stage: PipelineStage,
        progress: f32,
        chapter_index: Option<usize>,
        message: &str,
    ) {
        self.publish(WsEvent::JobProgress {
            job_id: job_id.to_string(),
            stage,
            progress,
            chapter_index,
            message: message.to_string(),
        });
    }

    pub fn publish_warning(&self, job_id: &str, message: &str) {
        self.publish(WsEvent::JobWarning {
            job_id: job_id.to_string(),
            message: message.to_string(),
        });
    }

    pub fn publish_completed(&self, job_id: &str, book_id: Uuid, title: &str) {
        self.publish(WsEvent::JobCompleted {
            job_id: job_id.to_string(),
            book_id,
            title: title.to_string(),
        });
        self.release_job(job_id);
    }

    pub fn publish_failed(&self, job_id: &str, stage: PipelineStage, error: &str) {
        self.publish(WsEvent::JobFailed {
            job_id: job_id.to_string(),
            stage,
            error: error.to_string(),
        });
        self.release_job(job_id);
    }

    pub fn publish_book_deleted(&self, book_id: Uuid) {
        self.publish(WsEvent::BookDeleted { book_id });
    }

    pub fn publish_book_updated(&self, book_id: Uuid) {
        self.publish(WsEvent::BookUpdated { book_id });
    }

    /// 释放任务通道，已订阅者在收完剩余事件后收到 Closed
    pub fn release_job(&self, job_id: &str) {
        self.job_channels.remove(job_id);
    }

    fn publish(&self, event: WsEvent) {
        if let Some(job_id) = event.job_id() {
            if let Some(sender) = self.job_channels.get(job_id) {
                if let Err(e) = sender.send(event.clone()) {
                    tracing::debug!(
                        job_id = %job_id,
                        error = %e,
                        "Failed to publish job event (no receivers)"
                    );
                }
            }
        }

        if let Err(e) = self.global_channel.send(event) {
            tracing::debug!(error = %e, "Failed to publish event (no receivers)");
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}
