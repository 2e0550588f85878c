//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping            GET   健康检查
//! - /api/catalog         GET   书籍类型、题材、语气
//! - /api/book/generate   POST  提交生成任务（进度通过 WS 推送）
//! - /api/book/list       GET   列出所有书籍
//! - /api/book/get        POST  获取书籍详情
//! - /api/book/delete     POST  删除书籍
//! - /api/book/export     POST  导出 pdf / docx / epub / zip
//! - /api/book/audio      POST  获取章节朗读音频
//! - /api/book/cover      POST  获取封面图片
//! - /api/book/illustration                 POST  获取章节插图
//! - /api/book/character/regenerate         POST  重新生成角色
//! - /api/book/character/portrait/generate  POST  生成角色肖像
//! - /api/book/character/portrait           POST  获取角色肖像
//! - /api/job/status      POST  查询任务状态
//! - /ws/events           WS    全局事件
//! - /ws/job/{job_id}     WS    单个任务事件

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/api", api_routes())
        .route("/ws/events", get(handlers::events_websocket_handler))
        .route("/ws/job/:job_id", get(handlers::job_websocket_handler))
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .route("/catalog", get(handlers::get_catalog))
        .nest("/book", book_routes())
        .route("/job/status", post(handlers::job_status))
}

fn book_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/generate", post(handlers::generate_book))
        .route("/list", get(handlers::list_books))
        .route("/get", post(handlers::get_book))
        .route("/delete", post(handlers::delete_book))
        .route("/export", post(handlers::export_book))
        .route("/audio", post(handlers::chapter_audio))
        .route("/cover", post(handlers::cover))
        .route("/illustration", post(handlers::illustration))
        .nest("/character", character_routes())
}

fn character_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/regenerate", post(handlers::regenerate_character))
        .route("/portrait/generate", post(handlers::generate_portrait))
        .route("/portrait", post(handlers::portrait))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tokio::sync::mpsc;
    use tower::util::ServiceExt;

    use crate::application::ports::{BookRepositoryPort, JobManagerPort};
    use crate::application::{CharacterGenerator, PortraitGenerator};
    use crate::domain::book::{
        Book, BookConfig, BookType, Chapter, Character, CoverImage, ImageRef, Tone,
    };
    use crate::domain::Outline;
    use crate::infrastructure::adapters::export::default_serializers;
    use crate::infrastructure::adapters::image::FakeImageGenerator;
    use crate::infrastructure::adapters::text::FakeTextGenerator;
    use crate::infrastructure::events::{EventPublisher, WsEvent};
    use crate::infrastructure::http::state::OnDemandGenerators;
    use crate::infrastructure::memory::InMemoryJobManager;
    use crate::infrastructure::persistence::SledBookRepository;

    struct TestApp {
        router: Router,
        state: Arc<AppState>,
        queue: mpsc::Receiver<String>,
        _dir: TempDir,
    }

    fn app() -> TestApp {
        app_with(OnDemandGenerators::default())
    }

    fn app_with(generators: OnDemandGenerators) -> TestApp {
        let dir = tempfile::tempdir().unwrap();
        let (tx, rx) = mpsc::channel(8);
        let state = Arc::new(AppState::new(
            Arc::new(InMemoryJobManager::new(tx)),
            Arc::new(SledBookRepository::open(dir.path()).unwrap()),
            Arc::new(EventPublisher::new()),
            default_serializers("en", None),
            generators,
        ));
        TestApp {
            router: create_routes().with_state(state.clone()),
            state,
            queue: rx,
            _dir: dir,
        }
    }

    fn narrated_book() -> Book {
        let config = BookConfig::new(
            BookType::Fiction,
            "Adventure",
            Tone::Default,
            3,
            Some("Sea & Sky".into()),
            None,
        )
        .unwrap();
        let titles: Vec<String> = vec!["Harbor".into(), "Storm".into(), "Shore".into()];
        let chapters = titles
            .iter()
            .enumerate()
            .map(|(i, t)| {
                Chapter::new(i, t.clone(), format!("{} text.", t))
                    .with_audio((i == 0).then(|| b"ID3audio".to_vec()))
                    .with_illustration(
                        (i == 1).then(|| ImageRef::Url("https://img.example/storm.png".into())),
                    )
            })
            .collect();
        let cover = CoverImage::new(ImageRef::Bytes(vec![0x89, b'P', b'N', b'G', 1, 2]), "sea");
        let characters = vec![Character {
            name: "Captain Mara".into(),
            role: "Protagonist".into(),
            personality: "Stubborn".into(),
            appearance: "Weathered coat".into(),
        }];
        Book::assemble(
            config,
            Outline::from_titles(titles),
            chapters,
            Some(cover),
            characters,
            Vec::new(),
        )
        .unwrap()
    }

    async fn send(
        router: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Vec<u8>, Option<String>) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec(), content_type)
    }

    async fn send_json(router: &Router, method: &str, uri: &str, body: Option<Value>) -> Value {
        let (status, bytes, _) = send(router, method, uri, body).await;
        assert_eq!(status, StatusCode::OK);
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_ping_and_catalog() {
        let app = app();

        let ping = send_json(&app.router, "GET", "/api/ping", None).await;
        assert_eq!(ping["errno"], 0);
        assert_eq!(ping["data"]["status"], "ok");

        let catalog = send_json(&app.router, "GET", "/api/catalog", None).await;
        assert_eq!(catalog["data"]["book_types"][0]["id"], "fiction");
        assert_eq!(catalog["data"]["min_chapters"], 3);
        assert_eq!(catalog["data"]["max_chapters"], 20);
        assert_eq!(
            catalog["data"]["export_formats"],
            json!(["pdf", "docx", "epub", "zip"])
        );
    }

    #[tokio::test]
    async fn test_generate_enqueues_and_reports_status() {
        let mut app = app();

        let body = json!({
            "book_type": "fiction",
            "genre": "Fantasy",
            "chapter_count": 3,
            "title": "The Enchanted Forest",
        });
        let created = send_json(&app.router, "POST", "/api/book/generate", Some(body)).await;
        assert_eq!(created["errno"], 0);
        assert_eq!(created["data"]["status"], "queued");
        let job_id = created["data"]["job_id"].as_str().unwrap().to_string();
        assert_eq!(app.queue.try_recv().unwrap(), job_id);

        let status = send_json(
            &app.router,
            "POST",
            "/api/job/status",
            Some(json!({ "job_id": job_id })),
        )
        .await;
        assert_eq!(status["data"]["status"], "queued");
        assert_eq!(status["data"]["stage"], "configured");
        assert_eq!(status["data"]["title"], "The Enchanted Forest");
    }

    #[tokio::test]
    async fn test_invalid_config_returns_errno_400() {
        let app = app();
        let body = json!({
            "book_type": "fiction",
            "genre": "Fantasy",
            "chapter_count": 21,
        });
        let rejected = send_json(&app.router, "POST", "/api/book/generate", Some(body)).await;
        assert_eq!(rejected["errno"], 400);
        assert!(rejected["data"].is_null());
        assert!(app.state.job_manager.list_jobs().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_job_and_book_return_404() {
        let app = app();
        let job = send_json(
            &app.router,
            "POST",
            "/api/job/status",
            Some(json!({ "job_id": "missing" })),
        )
        .await;
        assert_eq!(job["errno"], 404);

        let book = send_json(
            &app.router,
            "POST",
            "/api/book/get",
            Some(json!({ "id": uuid::Uuid::new_v4() })),
        )
        .await;
        assert_eq!(book["errno"], 404);
    }

    #[tokio::test]
    async fn test_book_read_endpoints() {
        let app = app();
        let book = narrated_book();
        app.state.book_repo.save(&book).await.unwrap();
        let id = book.id().to_string();

        let list = send_json(&app.router, "GET", "/api/book/list", None).await;
        assert_eq!(list["data"][0]["title"], "Sea & Sky");
        assert_eq!(list["data"][0]["narrated_chapters"], 1);

        let detail =
            send_json(&app.router, "POST", "/api/book/get", Some(json!({ "id": id }))).await;
        assert_eq!(detail["data"]["id"], id);
        assert_eq!(detail["data"]["outline"], json!(["Harbor", "Storm", "Shore"]));
        assert_eq!(detail["data"]["chapters"][0]["has_audio"], true);
        assert_eq!(detail["data"]["chapters"][1]["has_audio"], false);
        assert_eq!(detail["data"]["chapters"][1]["has_illustration"], true);
        assert_eq!(detail["data"]["characters"][0]["name"], "Captain Mara");
        assert_eq!(detail["data"]["characters"][0]["has_portrait"], false);

        let (_, pdf, content_type) = send(
            &app.router,
            "POST",
            "/api/book/export",
            Some(json!({ "id": id, "format": "pdf" })),
        )
        .await;
        assert_eq!(content_type.as_deref(), Some("application/pdf"));
        assert!(pdf.starts_with(b"%PDF"));

        let (_, audio, content_type) = send(
            &app.router,
            "POST",
            "/api/book/audio",
            Some(json!({ "id": id, "chapter": 0 })),
        )
        .await;
        assert_eq!(audio, b"ID3audio");
        assert_eq!(content_type.as_deref(), Some("audio/mpeg"));

        let missing_audio = send_json(
            &app.router,
            "POST",
            "/api/book/audio",
            Some(json!({ "id": id, "chapter": 1 })),
        )
        .await;
        assert_eq!(missing_audio["errno"], 409);

        let (_, cover, content_type) = send(
            &app.router,
            "POST",
            "/api/book/cover",
            Some(json!({ "id": id })),
        )
        .await;
        assert_eq!(content_type.as_deref(), Some("image/png"));
        assert_eq!(cover.len(), 6);

        let (status, _, _) = send(
            &app.router,
            "POST",
            "/api/book/illustration",
            Some(json!({ "id": id, "chapter": 1 })),
        )
        .await;
        assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);

        let bare = send_json(
            &app.router,
            "POST",
            "/api/book/illustration",
            Some(json!({ "id": id, "chapter": 0 })),
        )
        .await;
        assert_eq!(bare["errno"], 409);
    }

    #[tokio::test]
    async fn test_character_endpoints() {
        let text = Arc::new(FakeTextGenerator::scripted(vec![Ok(
            r#"{"name": "First Mate Ilo", "role": "Ally", "appearance": "Tattooed arms"}"#
                .to_string(),
        )]));
        let image = Arc::new(FakeImageGenerator::new());
        let app = app_with(OnDemandGenerators {
            characters: Some(Arc::new(CharacterGenerator::new(text, "m"))),
            portraits: Some(Arc::new(PortraitGenerator::new(image.clone(), 512, 512))),
        });
        let book = narrated_book();
        app.state.book_repo.save(&book).await.unwrap();
        let id = book.id().to_string();
        let mut events = app.state.event_publisher.subscribe();

        let unset = send_json(
            &app.router,
            "POST",
            "/api/book/character/portrait",
            Some(json!({ "id": id, "index": 0 })),
        )
        .await;
        assert_eq!(unset["errno"], 409);

        let generated = send_json(
            &app.router,
            "POST",
            "/api/book/character/portrait/generate",
            Some(json!({ "id": id, "index": 0 })),
        )
        .await;
        assert_eq!(generated["errno"], 0);
        assert_eq!(generated["data"]["has_portrait"], true);
        assert_eq!(
            image.requests()[0].prompt,
            "Portrait of Captain Mara based on appearance: Weathered coat"
        );
        assert!(matches!(events.try_recv(), Ok(WsEvent::BookUpdated { .. })));

        let (_, portrait, content_type) = send(
            &app.router,
            "POST",
            "/api/book/character/portrait",
            Some(json!({ "id": id, "index": 0 })),
        )
        .await;
        assert_eq!(content_type.as_deref(), Some("image/png"));
        assert!(portrait.starts_with(b"\x89PNG"));

        let regenerated = send_json(
            &app.router,
            "POST",
            "/api/book/character/regenerate",
            Some(json!({ "id": id, "index": 0 })),
        )
        .await;
        assert_eq!(regenerated["data"]["name"], "First Mate Ilo");
        assert_eq!(regenerated["data"]["index"], 0);
        assert_eq!(regenerated["data"]["has_portrait"], false);

        let detail =
            send_json(&app.router, "POST", "/api/book/get", Some(json!({ "id": id }))).await;
        assert_eq!(detail["data"]["characters"][0]["role"], "Ally");

        let missing = send_json(
            &app.router,
            "POST",
            "/api/book/character/regenerate",
            Some(json!({ "id": id, "index": 3 })),
        )
        .await;
        assert_eq!(missing["errno"], 404);
    }

    #[tokio::test]
    async fn test_character_endpoints_without_generators() {
        let app = app();
        let book = narrated_book();
        app.state.book_repo.save(&book).await.unwrap();

        for uri in ["/api/book/character/regenerate", "/api/book/character/portrait/generate"] {
            let disabled = send_json(
                &app.router,
                "POST",
                uri,
                Some(json!({ "id": book.id().to_string(), "index": 0 })),
            )
            .await;
            assert_eq!(disabled["errno"], 503);
        }
    }

    #[tokio::test]
    async fn test_unsupported_export_format() {
        let app = app();
        let book = narrated_book();
        app.state.book_repo.save(&book).await.unwrap();

        let rejected = send_json(
            &app.router,
            "POST",
            "/api/book/export",
            Some(json!({ "id": book.id().to_string(), "format": "mobi" })),
        )
        .await;
        assert_eq!(rejected["errno"], 400);
    }

    #[tokio::test]
    async fn test_delete_book_publishes_event() {
        let app = app();
        let book = narrated_book();
        app.state.book_repo.save(&book).await.unwrap();
        let mut events = app.state.event_publisher.subscribe();

        let deleted = send_json(
            &app.router,
            "POST",
            "/api/book/delete",
            Some(json!({ "id": book.id().to_string() })),
        )
        .await;
        assert_eq!(deleted["errno"], 0);
        assert_eq!(
            events.try_recv().unwrap(),
            WsEvent::BookDeleted {
                book_id: *book.id().as_uuid()
            }
        );

        let again = send_json(
            &app.router,
            "POST",
            "/api/book/delete",
            Some(json!({ "id": book.id().to_string() })),
        )
        .await;
        assert_eq!(again["errno"], 404);
    }
}
