//! Generation Worker - 后台书籍生成任务处理

use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};

use crate::application::pipeline::BookPipeline;
use crate::application::ports::{
    BookRepositoryPort, JobManagerPort, ProgressReporterPort, ProgressUpdate,
};
use crate::application::PipelineStage;
use crate::infrastructure::events::EventPublisher;

/// Worker 配置
#[derive(Debug, Clone)]
pub struct GenerationWorkerConfig {
    /// 最大并发生成任务数
    pub max_concurrent_jobs: usize,
}

impl Default for GenerationWorkerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: 1,
        }
    }
}

/// 把流水线进度写入任务状态并推送事件
struct JobProgressReporter {
    job_id: String,
    job_manager: Arc<dyn JobManagerPort>,
    event_publisher: Arc<EventPublisher>,
}

impl ProgressReporterPort for JobProgressReporter {
    fn on_progress(&self, update: ProgressUpdate) {
        if let Err(e) = self
            .job_manager
            .update_progress(&self.job_id, update.stage, update.progress)
        {
            tracing::warn!(job_id = %self.job_id, error = %e, "Failed to record job progress");
        }
        self.event_publisher.publish_progress(
            &self.job_id,
            update.stage,
            update.progress,
            update.chapter_index,
            &update.message,
        );
    }

    fn on_warning(&self, message: &str) {
        if let Err(e) = self
            .job_manager
            .add_warning(&self.job_id, message.to_string())
        {
            tracing::warn!(job_id = %self.job_id, error = %e, "Failed to record job warning");
        }
        self.event_publisher.publish_warning(&self.job_id, message);
    }
}

/// 生成 Worker
///
/// 从队列消费 job_id，运行流水线并保存生成的书籍
pub struct GenerationWorker {
    config: GenerationWorkerConfig,
    queue_receiver: mpsc::Receiver<String>,
    job_manager: Arc<dyn JobManagerPort>,
    pipeline: Arc<BookPipeline>,
    book_repo: Arc<dyn BookRepositoryPort>,
    event_publisher: Arc<EventPublisher>,
}

impl GenerationWorker {
    pub fn new(
        config: GenerationWorkerConfig,
        queue_receiver: mpsc::Receiver<String>,
        job_manager: Arc<dyn JobManagerPort>,
        pipeline: Arc<BookPipeline>,
        book_repo: Arc<dyn BookRepositoryPort>,
        event_publisher: Arc<EventPublisher>,
    ) -> Self {
        Self {
            config,
            queue_receiver,
            job_manager,
            pipeline,
            book_repo,
            event_publisher,
        }
    }

    /// 启动 Worker，队列关闭后返回
    pub async fn run(mut self) {
        let max_concurrent = self.config.max_concurrent_jobs.max(1);
        tracing::info!(max_concurrent_jobs = max_concurrent, "GenerationWorker started");

        let semaphore = Arc::new(Semaphore::new(max_concurrent));

        while let Some(job_id) = self.queue_receiver.recv().await {
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to acquire semaphore permit");
                    continue;
                }
            };

            let job_manager = self.job_manager.clone();
            let pipeline = self.pipeline.clone();
            let book_repo = self.book_repo.clone();
            let event_publisher = self.event_publisher.clone();

            tokio::spawn(async move {
                let _permit = permit;
                Self::process_job(&job_id, job_manager, pipeline, book_repo, event_publisher)
                    .await;
            });
        }

        tracing::info!("GenerationWorker stopped");
    }

    async fn process_job(
        job_id: &str,
        job_manager: Arc<dyn JobManagerPort>,
        pipeline: Arc<BookPipeline>,
        book_repo: Arc<dyn BookRepositoryPort>,
        event_publisher: Arc<EventPublisher>,
    ) {
        let job = match job_manager.get_job(job_id) {
            Some(job) => job,
            None => {
                tracing::warn!(job_id = %job_id, "Job not found, skipping");
                return;
            }
        };

        if let Err(e) = job_manager.set_running(job_id) {
            tracing::error!(job_id = %job_id, error = %e, "Failed to start job");
            return;
        }

        tracing::info!(
            job_id = %job_id,
            title = %job.config.title(),
            chapter_count = job.config.chapter_count(),
            "Book generation started"
        );

        let reporter = JobProgressReporter {
            job_id: job_id.to_string(),
            job_manager: job_manager.clone(),
            event_publisher: event_publisher.clone(),
        };

        let book = match pipeline.run(job.config, &reporter).await {
            Ok(book) => book,
            Err(e) => {
                let stage = e.stage();
                let message = e.to_string();
                tracing::error!(
                    job_id = %job_id,
                    stage = %stage,
                    error = %message,
                    "Book generation failed"
                );
                Self::fail(job_id, &job_manager, &event_publisher, stage, &message);
                return;
            }
        };

        if let Err(e) = book_repo.save(&book).await {
            let message = format!("Failed to save book: {}", e);
            tracing::error!(
                job_id = %job_id,
                book_id = %book.id(),
                error = %e,
                "Failed to save book"
            );
            Self::fail(
                job_id,
                &job_manager,
                &event_publisher,
                PipelineStage::Assembled,
                &message,
            );
            return;
        }

        if let Err(e) = job_manager.set_completed(job_id, *book.id()) {
            tracing::error!(job_id = %job_id, error = %e, "Failed to mark job completed");
        }
        event_publisher.publish_completed(job_id, *book.id().as_uuid(), book.title());

        tracing::info!(
            job_id = %job_id,
            book_id = %book.id(),
            chapters = book.chapters().len(),
            narrated = book.narrated_chapter_count(),
            illustrated = book.illustrated_chapter_count(),
            warnings = book.warnings().len(),
            "Book generation completed"
        );
    }

    fn fail(
        job_id: &str,
        job_manager: &Arc<dyn JobManagerPort>,
        event_publisher: &EventPublisher,
        stage: PipelineStage,
        message: &str,
    ) {
        if let Err(e) = job_manager.set_failed(job_id, stage, message.to_string()) {
            tracing::error!(job_id = %job_id, error = %e, "Failed to mark job failed");
        }
        event_publisher.publish_failed(job_id, stage, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::tempdir;

    use crate::application::generators::{
        CharacterGenerator, ContentGenerator, CoverGenerator, IllustrationGenerator,
        NarrationGenerator,
    };
    use crate::application::ports::{GenerationJob, JobState};
    use crate::domain::book::{BookConfig, BookType, Tone};
    use crate::infrastructure::adapters::image::FakeImageGenerator;
    use crate::infrastructure::adapters::speech::FakeSpeechSynthesizer;
    use crate::infrastructure::adapters::text::FakeTextGenerator;
    use crate::infrastructure::events::WsEvent;
    use crate::infrastructure::memory::InMemoryJobManager;
    use crate::infrastructure::persistence::SledBookRepository;

    fn config() -> BookConfig {
        BookConfig::new(
            BookType::NonFiction,
            "Productivity",
            Tone::Instructive,
            3,
            Some("Deep Focus".into()),
            None,
        )
        .unwrap()
    }

    struct Harness {
        manager: Arc<InMemoryJobManager>,
        repo: Arc<SledBookRepository>,
        publisher: Arc<EventPublisher>,
        _dir: tempfile::TempDir,
    }

    fn start(text: FakeTextGenerator) -> Harness {
        start_with(BookPipeline::new(ContentGenerator::new(Arc::new(text), "test-model")))
    }

    fn start_with(pipeline: BookPipeline) -> Harness {
        let dir = tempdir().unwrap();
        let (tx, rx) = mpsc::channel(8);
        let manager = Arc::new(InMemoryJobManager::new(tx));
        let repo = Arc::new(SledBookRepository::open(dir.path()).unwrap());
        let publisher = Arc::new(EventPublisher::new());

        let worker = GenerationWorker::new(
            GenerationWorkerConfig::default(),
            rx,
            manager.clone(),
            Arc::new(pipeline),
            repo.clone(),
            publisher.clone(),
        );
        tokio::spawn(worker.run());

        Harness {
            manager,
            repo,
            publisher,
            _dir: dir,
        }
    }

    async fn wait_finished(manager: &InMemoryJobManager, job_id: &str) -> GenerationJob {
        for _ in 0..200 {
            if let Some(job) = manager.get_job(job_id) {
                if job.state.is_finished() {
                    return job;
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("job {} did not finish", job_id);
    }

    #[tokio::test]
    async fn test_completed_job_saves_book() {
        let h = start(FakeTextGenerator::new(|call, _| {
            Ok(if call == 0 {
                "1. Why Focus\n2. Building Habits\n3. Staying Sharp".to_string()
            } else {
                format!("Body {}", call)
            })
        }));

        let job = GenerationJob::new(config());
        let mut events = h.publisher.subscribe_job(&job.job_id);
        let job_id = h.manager.submit(job).unwrap();

        let done = wait_finished(&h.manager, &job_id).await;
        assert_eq!(done.state, JobState::Completed);
        assert_eq!(done.progress, 1.0);

        let book_id = done.book_id.unwrap();
        let book = h.repo.find_by_id(&book_id).await.unwrap().unwrap();
        assert_eq!(book.title(), "Deep Focus");
        assert_eq!(book.chapters().len(), 3);

        let mut last = None;
        while let Ok(event) = events.recv().await {
            last = Some(event);
        }
        assert!(matches!(last, Some(WsEvent::JobCompleted { .. })));
    }

    #[tokio::test]
    async fn test_full_fiction_pipeline_in_worker() {
        let text = Arc::new(FakeTextGenerator::new(|call, request| {
            let prompt = &request.messages[1].content;
            Ok(if call == 0 {
                "1. The Call\n2. Into the Woods\n3. The Return".to_string()
            } else if prompt.contains("main characters") {
                r#"[{"name": "Lily", "role": "Protagonist", "appearance": "Red hair"}]"#
                    .to_string()
            } else {
                format!("Lily walked on. Part {}.", call)
            })
        }));
        let image = Arc::new(FakeImageGenerator::new());
        let speech = Arc::new(FakeSpeechSynthesizer::new());
        let pipeline = BookPipeline::new(ContentGenerator::new(text.clone(), "m"))
            .with_narration(NarrationGenerator::new(speech, "en"))
            .with_cover(CoverGenerator::new(image.clone(), 768, 1024))
            .with_illustrations(IllustrationGenerator::new(image.clone(), 768, 1024))
            .with_characters(CharacterGenerator::new(text, "m"))
            .with_chapter_concurrency(2);
        let h = start_with(pipeline);

        let fiction = BookConfig::new(
            BookType::Fiction,
            "Fantasy",
            Tone::Default,
            3,
            Some("The Enchanted Forest".into()),
            None,
        )
        .unwrap();
        let job_id = h.manager.submit(GenerationJob::new(fiction)).unwrap();
        let done = wait_finished(&h.manager, &job_id).await;
        assert_eq!(done.state, JobState::Completed);
        assert!(done.warnings.is_empty());

        let book = h
            .repo
            .find_by_id(&done.book_id.unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(book.narrated_chapter_count(), 3);
        assert_eq!(book.illustrated_chapter_count(), 3);
        assert!(book.cover().is_some());
        assert_eq!(book.characters()[0].name, "Lily");
        // 3 张插图 + 1 张封面
        assert_eq!(image.requests().len(), 4);
    }

    #[tokio::test]
    async fn test_failed_outline_marks_job_failed() {
        let h = start(FakeTextGenerator::scripted(vec![Ok("\n   \n".to_string())]));

        let job_id = h.manager.submit(GenerationJob::new(config())).unwrap();
        let done = wait_finished(&h.manager, &job_id).await;

        assert_eq!(done.state, JobState::Failed);
        assert_eq!(done.stage, PipelineStage::OutlineFailed);
        assert!(done.error.unwrap().contains("no chapter titles"));
        assert!(h.repo.find_all().await.unwrap().is_empty());
    }
}
