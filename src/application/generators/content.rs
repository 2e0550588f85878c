//! Content Generator - 大纲与章节文本生成

use std::sync::Arc;

use super::prompts;
use crate::application::ports::{ChatRequest, ProviderError, TextGeneratorPort};
use crate::domain::book::BookConfig;

/// 内容生成器
///
/// 通过文本生成服务产出大纲原文与章节正文
pub struct ContentGenerator {
    text: Arc<dyn TextGeneratorPort>,
    model: String,
}

impl ContentGenerator {
    pub fn new(text: Arc<dyn TextGeneratorPort>, model: impl Into<String>) -> Self {
        Self {
            text,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// 生成大纲原文（未解析）
    pub async fn generate_outline(&self, config: &BookConfig) -> Result<String, ProviderError> {
        tracing::debug!(
            genre = %config.genre(),
            chapters = config.chapter_count(),
            "Requesting outline"
        );

        let request = ChatRequest {
            model: self.model.clone(),
            messages: prompts::outline_messages(config),
        };
        self.text.complete(request).await
    }

    /// 生成第 index 章（0 起）的正文
    pub async fn generate_chapter(
        &self,
        config: &BookConfig,
        index: usize,
        title: &str,
    ) -> Result<String, ProviderError> {
        tracing::debug!(chapter_index = index, title = %title, "Requesting chapter");

        let request = ChatRequest {
            model: self.model.clone(),
            messages: prompts::chapter_messages(config, index, title),
        };
        let text = self.text.complete(request).await?;
        Ok(text.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::book::{BookType, Tone};
    use crate::infrastructure::adapters::text::FakeTextGenerator;

    fn config() -> BookConfig {
        BookConfig::new(BookType::Fiction, "Mystery", Tone::Suspenseful, 3, None, None).unwrap()
    }

    #[tokio::test]
    async fn test_outline_uses_configured_model() {
        let fake = Arc::new(FakeTextGenerator::scripted(vec![Ok("1. A\n2. B".to_string())]));
        let generator = ContentGenerator::new(fake.clone(), "test/model");

        let raw = generator.generate_outline(&config()).await.unwrap();
        assert_eq!(raw, "1. A\n2. B");

        let calls = fake.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].model, "test/model");
        assert!(calls[0].messages[1].content.contains("tense, thrilling, page-turning"));
    }

    #[tokio::test]
    async fn test_chapter_error_is_propagated() {
        let fake = Arc::new(FakeTextGenerator::scripted(vec![Err(ProviderError::Status {
            status: 401,
            message: "unauthorized".into(),
        })]));
        let generator = ContentGenerator::new(fake, "m");

        let result = generator.generate_chapter(&config(), 0, "Opening").await;
        assert!(matches!(result, Err(ProviderError::Status { status: 401, .. })));
    }
}
