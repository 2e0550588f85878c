//! WebSocket Handlers - 生成进度推送

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::application::ports::{GenerationJob, JobState};
use crate::infrastructure::events::WsEvent;
use crate::infrastructure::http::state::AppState;

/// 全局 WebSocket（所有任务事件 + 书籍删除）
pub async fn events_websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| async move {
        let event_rx = state.event_publisher.subscribe();
        tracing::info!("Events WebSocket connected");
        forward_events(socket, event_rx, None).await;
        tracing::info!("Events WebSocket disconnected");
    })
}

/// 单个任务的 WebSocket
pub async fn job_websocket_handler(
    ws: WebSocketUpgrade,
    Path(job_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_job_socket(socket, job_id, state))
}

/// 已结束任务的最终事件
fn final_event(job: &GenerationJob) -> Option<WsEvent> {
    match job.state {
        JobState::Completed => job.book_id.map(|book_id| WsEvent::JobCompleted {
            job_id: job.job_id.clone(),
            book_id: *book_id.as_uuid(),
            title: job.config.title().to_string(),
        }),
        JobState::Failed => Some(WsEvent::JobFailed {
            job_id: job.job_id.clone(),
            stage: job.stage,
            error: job.error.clone().unwrap_or_default(),
        }),
        JobState::Queued | JobState::Running => None,
    }
}

async fn handle_job_socket(mut socket: WebSocket, job_id: String, state: Arc<AppState>) {
    if state.job_manager.get_job(&job_id).is_none() {
        tracing::warn!(job_id = %job_id, "WebSocket connection rejected: unknown job");
        let _ = socket.close().await;
        return;
    }

    let event_rx = state.event_publisher.subscribe_job(&job_id);

    // 订阅之后再读一次状态，任务可能在两者之间已经结束
    let finished = state
        .job_manager
        .get_job(&job_id)
        .filter(|job| job.state.is_finished());
    if let Some(job) = finished {
        state.event_publisher.release_job(&job_id);
        if let Some(event) = final_event(&job) {
            if let Ok(json) = serde_json::to_string(&event) {
                let _ = socket.send(Message::Text(json)).await;
            }
        }
        let _ = socket.close().await;
        return;
    }

    tracing::info!(job_id = %job_id, "Job WebSocket connected");
    forward_events(socket, event_rx, Some(&job_id)).await;
    tracing::info!(job_id = %job_id, "Job WebSocket disconnected");
}

/// 把广播事件转发给客户端，直到任一方关闭
async fn forward_events(
    socket: WebSocket,
    mut event_rx: broadcast::Receiver<WsEvent>,
    job_id: Option<&str>,
) {
    let (mut sender, mut receiver) = socket.split();
    let job_id = job_id.map(str::to_string);

    let forward_task = tokio::spawn(async move {
        loop {
            let event = match event_rx.recv().await {
                Ok(event) => event,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(
                        job_id = ?job_id,
                        skipped = skipped,
                        "WebSocket lagged behind events"
                    );
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            };

            let msg = match serde_json::to_string(&event) {
                Ok(json) => Message::Text(json),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize event");
                    continue;
                }
            };

            if let Err(e) = sender.send(msg).await {
                tracing::debug!(job_id = ?job_id, error = %e, "Failed to send WebSocket message");
                break;
            }
        }
        let _ = sender.close().await;
    });

    // 接收客户端消息（心跳）
    let receive_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => break,
                Err(e) => {
                    tracing::debug!(error = %e, "WebSocket error");
                    break;
                }
                // Ping 由 axum 自动响应
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = forward_task => {}
        _ = receive_task => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::PipelineStage;
    use crate::domain::book::{BookConfig, BookId, BookType, Tone};

    fn job() -> GenerationJob {
        let config = BookConfig::new(
            BookType::Fiction,
            "Horror",
            Tone::Suspenseful,
            3,
            Some("Night Shift".into()),
            None,
        )
        .unwrap();
        GenerationJob::new(config)
    }

    #[test]
    fn test_final_event_for_finished_jobs() {
        let mut completed = job();
        completed.state = JobState::Completed;
        completed.book_id = Some(BookId::new());
        assert!(matches!(
            final_event(&completed),
            Some(WsEvent::JobCompleted { ref title, .. }) if title == "Night Shift"
        ));

        let mut failed = job();
        failed.state = JobState::Failed;
        failed.stage = PipelineStage::ChapterFailed;
        failed.error = Some("timeout".into());
        assert!(matches!(
            final_event(&failed),
            Some(WsEvent::JobFailed { stage: PipelineStage::ChapterFailed, .. })
        ));

        assert!(final_event(&job()).is_none());
    }
}
