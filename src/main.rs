//! Storyloom - 书籍生成服务
//!
//! - Domain: book/, outline (Bounded Context)
//! - Application: generators, pipeline, commands, queries, ports
//! - Infrastructure: http, memory, worker, persistence, adapters, events

use std::sync::Arc;

use storyloom::application::ports::{ImageGeneratorPort, TextGeneratorPort};
use storyloom::application::{
    BookPipeline, CharacterGenerator, ContentGenerator, CoverGenerator, IllustrationGenerator,
    NarrationGenerator, PortraitGenerator,
};
use storyloom::config::{load_config, print_config, AppConfig};
use storyloom::infrastructure::adapters::export::{default_serializers, UnicodeFont};
use storyloom::infrastructure::adapters::image::{ReplicateClient, ReplicateClientConfig};
use storyloom::infrastructure::adapters::speech::{HttpTtsClient, HttpTtsClientConfig};
use storyloom::infrastructure::adapters::text::{OpenRouterClient, OpenRouterClientConfig};
use storyloom::infrastructure::events::EventPublisher;
use storyloom::infrastructure::http::{AppState, HttpServer, OnDemandGenerators, ServerConfig};
use storyloom::infrastructure::memory::InMemoryJobManager;
use storyloom::infrastructure::persistence::{SledBookRepository, SledNarrationCache};
use storyloom::infrastructure::worker::{GenerationWorker, GenerationWorkerConfig};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Storyloom starting");
    print_config(&config);

    tokio::fs::create_dir_all(&config.storage.data_dir).await?;

    let book_repo = SledBookRepository::open(config.storage.books_path())?.arc();

    let text = text_client(&config)?;
    let image = image_client(&config)?;
    let pipeline = Arc::new(build_pipeline(&config, text.clone(), image.clone())?);

    let event_publisher = EventPublisher::new().arc();

    // 创建任务队列
    let (job_tx, job_rx) = mpsc::channel(config.generation.queue_capacity);
    let job_manager = InMemoryJobManager::new(job_tx).arc();

    let worker = GenerationWorker::new(
        GenerationWorkerConfig {
            max_concurrent_jobs: config.generation.max_concurrent_jobs,
        },
        job_rx,
        job_manager.clone(),
        pipeline,
        book_repo.clone(),
        event_publisher.clone(),
    );
    tokio::spawn(worker.run());

    let state = AppState::new(
        job_manager,
        book_repo.clone(),
        event_publisher,
        default_serializers(&config.speech.lang, load_pdf_font(&config)?),
        OnDemandGenerators {
            characters: Some(Arc::new(CharacterGenerator::new(text, &config.text.model))),
            portraits: image.map(|image| {
                Arc::new(PortraitGenerator::new(
                    image,
                    config.image.portrait_width,
                    config.image.portrait_height,
                ))
            }),
        },
    );
    let server = HttpServer::new(
        ServerConfig::new(&config.server.host, config.server.port),
        state,
    );

    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
                return;
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    book_repo.flush()?;
    tracing::info!("Server shutdown complete");

    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let log_filter = format!(
        "{},storyloom={},tower_http=debug",
        config.log.level, config.log.level
    );
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if config.log.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// 配置的字体加载失败时拒绝启动；未配置时尝试系统字体
fn load_pdf_font(config: &AppConfig) -> anyhow::Result<Option<Arc<UnicodeFont>>> {
    if let Some(path) = &config.export.pdf_font {
        let font = UnicodeFont::load(path).map_err(|e| {
            anyhow::anyhow!("Failed to load PDF font {}: {}", path.display(), e)
        })?;
        tracing::info!(path = %path.display(), "Loaded PDF font");
        return Ok(Some(Arc::new(font)));
    }

    match UnicodeFont::discover() {
        Some((path, font)) => {
            tracing::info!(path = %path.display(), "Using system font for non-Latin PDF text");
            Ok(Some(Arc::new(font)))
        }
        None => {
            tracing::warn!("No Unicode font found, PDF export limited to WinAnsi characters");
            Ok(None)
        }
    }
}

fn text_client(config: &AppConfig) -> anyhow::Result<Arc<dyn TextGeneratorPort>> {
    Ok(Arc::new(OpenRouterClient::new(OpenRouterClientConfig {
        url: config.text.url.clone(),
        api_key: config.text.api_key.clone(),
        temperature: config.text.temperature,
        max_tokens: config.text.max_tokens,
        timeout_secs: config.text.timeout_secs,
        retry: config.text.retry_policy(),
        referer: config.text.referer.clone(),
        app_title: config.text.app_title.clone(),
    })?))
}

/// 图像服务关闭时返回 None
fn image_client(config: &AppConfig) -> anyhow::Result<Option<Arc<dyn ImageGeneratorPort>>> {
    if !config.image.enabled {
        return Ok(None);
    }
    Ok(Some(Arc::new(ReplicateClient::new(ReplicateClientConfig {
        base_url: config.image.base_url.clone(),
        api_token: config.image.api_token.clone(),
        model: config.image.model.clone(),
        negative_prompt: config.image.negative_prompt.clone(),
        num_inference_steps: config.image.num_inference_steps,
        guidance_scale: config.image.guidance_scale,
        timeout_secs: config.image.timeout_secs,
        max_wait_secs: config.image.max_wait_secs,
        poll_interval_ms: config.image.poll_interval_ms,
        retry: config.image.retry_policy(),
    })?)))
}

/// 按配置组装生成器与流水线
fn build_pipeline(
    config: &AppConfig,
    text: Arc<dyn TextGeneratorPort>,
    image: Option<Arc<dyn ImageGeneratorPort>>,
) -> anyhow::Result<BookPipeline> {
    let mut pipeline = BookPipeline::new(ContentGenerator::new(text.clone(), &config.text.model))
        .with_chapter_concurrency(config.generation.chapter_concurrency);

    if config.generation.characters {
        pipeline = pipeline.with_characters(CharacterGenerator::new(text, &config.text.model));
    }

    if config.speech.enabled {
        let speech = Arc::new(HttpTtsClient::new(
            HttpTtsClientConfig::new(&config.speech.url)
                .with_timeout(config.speech.timeout_secs)
                .with_retry(config.speech.retry_policy()),
        )?);
        let mut narration = NarrationGenerator::new(speech, &config.speech.lang);
        if config.speech.cache {
            let cache = SledNarrationCache::open(config.storage.narration_cache_path())?.arc();
            narration = narration.with_cache(cache);
        }
        pipeline = pipeline.with_narration(narration);
    }

    if let Some(image) = image {
        if config.image.illustrations {
            pipeline = pipeline.with_illustrations(IllustrationGenerator::new(
                image.clone(),
                config.image.width,
                config.image.height,
            ));
        }
        pipeline = pipeline.with_cover(CoverGenerator::new(
            image,
            config.image.width,
            config.image.height,
        ));
    }

    Ok(pipeline)
}
