//! Book Pipeline - 流水线编排
//!
//! 唯一持有生成中间状态的地方，所有入口（HTTP、后台任务、测试）共用

use std::sync::atomic::{AtomicUsize, Ordering};

use futures_util::{stream, FutureExt, StreamExt};

use super::{PipelineError, PipelineStage};
use crate::application::generators::{
    CharacterGenerator, ContentGenerator, CoverGenerator, IllustrationGenerator,
    NarrationGenerator,
};
use crate::application::ports::{ProgressReporterPort, ProgressUpdate, ProviderError};
use crate::domain::book::{Book, BookConfig, BookType, Chapter, Character, CoverImage};
use crate::domain::Outline;

/// 进度计数器
///
/// 总步数 = 大纲 + 每章 + 封面 + 角色
struct ProgressTracker<'a> {
    reporter: &'a dyn ProgressReporterPort,
    done: AtomicUsize,
    total: usize,
}

impl<'a> ProgressTracker<'a> {
    fn new(reporter: &'a dyn ProgressReporterPort, total: usize) -> Self {
        Self {
            reporter,
            done: AtomicUsize::new(0),
            total: total.max(1),
        }
    }

    fn fraction(&self) -> f32 {
        self.done.load(Ordering::SeqCst) as f32 / self.total as f32
    }

    fn report(&self, stage: PipelineStage, message: impl Into<String>) {
        self.reporter
            .on_progress(ProgressUpdate::new(stage, self.fraction(), message));
    }

    fn step(&self, stage: PipelineStage, message: impl Into<String>) {
        self.done.fetch_add(1, Ordering::SeqCst);
        self.report(stage, message);
    }

    fn step_chapter(&self, index: usize, message: impl Into<String>) {
        self.done.fetch_add(1, Ordering::SeqCst);
        self.reporter.on_progress(
            ProgressUpdate::new(PipelineStage::ChaptersGenerating, self.fraction(), message)
                .with_chapter(index),
        );
    }

    fn resize(&mut self, total: usize) {
        self.total = total.max(1);
    }
}

/// 单章生成结果
struct ChapterOutcome {
    chapter: Chapter,
    warnings: Vec<String>,
}

/// 书籍生成流水线
pub struct BookPipeline {
    content: ContentGenerator,
    narration: Option<NarrationGenerator>,
    cover: Option<CoverGenerator>,
    illustrations: Option<IllustrationGenerator>,
    characters: Option<CharacterGenerator>,
    chapter_concurrency: usize,
}

impl BookPipeline {
    pub fn new(content: ContentGenerator) -> Self {
        Self {
            content,
            narration: None,
            cover: None,
            illustrations: None,
            characters: None,
            chapter_concurrency: 1,
        }
    }

    pub fn with_narration(mut self, narration: NarrationGenerator) -> Self {
        self.narration = Some(narration);
        self
    }

    pub fn with_cover(mut self, cover: CoverGenerator) -> Self {
        self.cover = Some(cover);
        self
    }

    /// 只用于小说章节
    pub fn with_illustrations(mut self, illustrations: IllustrationGenerator) -> Self {
        self.illustrations = Some(illustrations);
        self
    }

    pub fn with_characters(mut self, characters: CharacterGenerator) -> Self {
        self.characters = Some(characters);
        self
    }

    /// 同时生成的章节数，1 表示严格顺序
    pub fn with_chapter_concurrency(mut self, concurrency: usize) -> Self {
        self.chapter_concurrency = concurrency.max(1);
        self
    }

    /// 运行完整流水线
    pub async fn run(
        &self,
        config: BookConfig,
        progress: &dyn ProgressReporterPort,
    ) -> Result<Book, PipelineError> {
        let wants_characters =
            self.characters.is_some() && config.book_type() == BookType::Fiction;
        let fixed_steps = 1 + usize::from(self.cover.is_some()) + usize::from(wants_characters);
        let mut tracker = ProgressTracker::new(progress, fixed_steps + config.chapter_count());
        let mut warnings = Vec::new();

        tracker.report(PipelineStage::Configured, "Configuration accepted");

        // 1. 大纲
        tracker.report(PipelineStage::OutlineRequested, "Generating outline");
        let raw = self
            .content
            .generate_outline(&config)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Outline generation failed");
                PipelineError::OutlineFailed(e)
            })?;

        let outline = Outline::parse(&raw, config.chapter_count());
        if outline.is_empty() {
            tracing::error!("Outline contained no chapter titles");
            return Err(PipelineError::EmptyOutline);
        }
        if outline.len() < config.chapter_count() {
            tracing::info!(
                requested = config.chapter_count(),
                parsed = outline.len(),
                "Outline shorter than requested, continuing with fewer chapters"
            );
        }
        tracker.resize(fixed_steps + outline.len());
        tracker.step(
            PipelineStage::OutlineParsed,
            format!("Outline ready with {} chapters", outline.len()),
        );

        // 2. 章节（按序产出）
        let chapters = self
            .generate_chapters(&config, &outline, &tracker, &mut warnings)
            .await?;

        // 3. 封面
        let cover = match &self.cover {
            Some(generator) => {
                tracker.report(PipelineStage::CoverRequested, "Generating cover");
                let cover = self.generate_cover(generator, &config, &mut warnings, progress).await;
                tracker.step(PipelineStage::CoverRequested, "Cover step finished");
                cover
            }
            None => None,
        };

        // 4. 角色
        let characters = match (&self.characters, wants_characters) {
            (Some(generator), true) => {
                tracker.report(PipelineStage::CharactersRequested, "Generating characters");
                let characters = match generator.generate_characters(&config, &outline).await {
                    Ok(characters) => characters,
                    Err(e) => {
                        let warning = format!("Character generation failed: {}", e);
                        tracing::warn!(error = %e, "Character generation failed");
                        progress.on_warning(&warning);
                        warnings.push(warning);
                        Vec::new()
                    }
                };
                tracker.step(PipelineStage::CharactersRequested, "Characters step finished");
                characters
            }
            _ => Vec::<Character>::new(),
        };

        // 5. 组装
        let book = Book::assemble(config, outline, chapters, cover, characters, warnings)?;
        progress.on_progress(ProgressUpdate::new(
            PipelineStage::Assembled,
            1.0,
            "Book assembled",
        ));

        tracing::info!(
            book_id = %book.id(),
            title = %book.title(),
            chapters = book.chapters().len(),
            narrated = book.narrated_chapter_count(),
            illustrated = book.illustrated_chapter_count(),
            has_cover = book.cover().is_some(),
            "Book generated"
        );
        Ok(book)
    }

    async fn generate_chapters(
        &self,
        config: &BookConfig,
        outline: &Outline,
        tracker: &ProgressTracker<'_>,
        warnings: &mut Vec<String>,
    ) -> Result<Vec<Chapter>, PipelineError> {
        tracker.report(
            PipelineStage::ChaptersGenerating,
            format!("Generating {} chapters", outline.len()),
        );

        // 装箱后的 future 为 Send，流水线可以在 tokio::spawn 中运行
        let jobs: Vec<_> = outline
            .titles()
            .iter()
            .enumerate()
            .map(|(index, title)| self.generate_chapter(config, index, title).boxed())
            .collect();

        // buffered 保持输出顺序与大纲一致
        let mut results = stream::iter(jobs).buffered(self.chapter_concurrency);
        let mut chapters = Vec::with_capacity(outline.len());

        while let Some(result) = results.next().await {
            match result {
                Ok(outcome) => {
                    for warning in outcome.warnings {
                        tracker.reporter.on_warning(&warning);
                        warnings.push(warning);
                    }
                    tracker.step_chapter(
                        outcome.chapter.index(),
                        format!("Finished {}", outcome.chapter.heading()),
                    );
                    chapters.push(outcome.chapter);
                }
                Err((index, title, source)) => {
                    tracing::error!(
                        chapter_index = index,
                        completed = chapters.len(),
                        error = %source,
                        "Chapter generation failed, discarding partial book"
                    );
                    return Err(PipelineError::ChapterFailed {
                        index,
                        title,
                        completed: chapters.len(),
                        source,
                    });
                }
            }
        }

        Ok(chapters)
    }

    async fn generate_chapter(
        &self,
        config: &BookConfig,
        index: usize,
        title: &str,
    ) -> Result<ChapterOutcome, (usize, String, ProviderError)> {
        let text = self
            .content
            .generate_chapter(config, index, title)
            .await
            .map_err(|e| (index, title.to_string(), e))?;

        let mut chapter = Chapter::new(index, title, text);
        let mut warnings = Vec::new();

        if let Some(narration) = &self.narration {
            match narration.synthesize(chapter.text()).await {
                Ok(audio) => chapter = chapter.with_audio(Some(audio)),
                Err(e) => {
                    tracing::warn!(chapter_index = index, error = %e, "Narration failed");
                    warnings.push(format!("Narration failed for chapter {}: {}", index + 1, e));
                }
            }
        }

        let illustrator = self
            .illustrations
            .as_ref()
            .filter(|_| config.book_type() == BookType::Fiction);
        if let Some(illustrator) = illustrator {
            match illustrator.illustrate(config, &chapter).await {
                Ok(image) => chapter = chapter.with_illustration(Some(image)),
                Err(e) => {
                    tracing::warn!(chapter_index = index, error = %e, "Illustration failed");
                    warnings.push(format!("Illustration failed for chapter {}: {}", index + 1, e));
                }
            }
        }

        Ok(ChapterOutcome { chapter, warnings })
    }

    async fn generate_cover(
        &self,
        generator: &CoverGenerator,
        config: &BookConfig,
        warnings: &mut Vec<String>,
        progress: &dyn ProgressReporterPort,
    ) -> Option<CoverImage> {
        match generator.generate_cover(config).await {
            Ok(cover) => Some(cover),
            Err(e) => {
                let warning = format!("Cover generation failed: {}", e);
                tracing::warn!(error = %e, "Cover generation failed");
                progress.on_warning(&warning);
                warnings.push(warning);
                None
            }
        }
    }
}
