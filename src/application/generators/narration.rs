//! Narration Generator - 章节朗读

use std::sync::Arc;

use thiserror::Error;

use crate::application::ports::{
    generate_cache_key, NarrationCachePort, ProviderError, SpeechRequest, SpeechSynthesizerPort,
};

/// 朗读错误
#[derive(Debug, Error)]
pub enum NarrationError {
    #[error("Nothing to narrate")]
    EmptyText,

    #[error("Speech provider returned no audio")]
    EmptyAudio,

    #[error("Speech provider error: {0}")]
    Provider(#[from] ProviderError),
}

/// 朗读前把换行压平为空格
pub fn flatten_for_speech(text: &str) -> String {
    text.replace("\r\n", " ")
        .replace(|c: char| c == '\n' || c == '\r', " ")
        .trim()
        .to_string()
}

/// 朗读生成器
pub struct NarrationGenerator {
    speech: Arc<dyn SpeechSynthesizerPort>,
    cache: Option<Arc<dyn NarrationCachePort>>,
    lang: String,
}

impl NarrationGenerator {
    pub fn new(speech: Arc<dyn SpeechSynthesizerPort>, lang: impl Into<String>) -> Self {
        Self {
            speech,
            cache: None,
            lang: lang.into(),
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn NarrationCachePort>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// 合成一段文本的音频
    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>, NarrationError> {
        let text = flatten_for_speech(text);
        if text.is_empty() {
            return Err(NarrationError::EmptyText);
        }

        let cache_key = generate_cache_key(&text, &self.lang);
        if let Some(cache) = &self.cache {
            match cache.get(&cache_key).await {
                Ok(Some(audio)) => {
                    tracing::debug!(cache_key = %cache_key, "Narration cache hit");
                    return Ok(audio);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(
                        cache_key = %cache_key,
                        error = %e,
                        "Narration cache read failed"
                    );
                }
            }
        }

        let audio = self
            .speech
            .synthesize(SpeechRequest {
                text,
                lang: self.lang.clone(),
            })
            .await?;
        if audio.is_empty() {
            return Err(NarrationError::EmptyAudio);
        }

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.put(&cache_key, &audio).await {
                tracing::warn!(cache_key = %cache_key, error = %e, "Narration cache write failed");
            }
        }

        Ok(audio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::adapters::speech::FakeSpeechSynthesizer;
    use crate::infrastructure::persistence::sled::SledNarrationCache;

    #[test]
    fn test_flatten_for_speech() {
        assert_eq!(flatten_for_speech("One.\nTwo.\r\nThree.\n"), "One. Two. Three.");
    }

    #[tokio::test]
    async fn test_newlines_are_flattened_before_synthesis() {
        let fake = Arc::new(FakeSpeechSynthesizer::new());
        let narration = NarrationGenerator::new(fake.clone(), "en");

        let audio = narration.synthesize("Line one\nLine two").await.unwrap();
        assert!(!audio.is_empty());

        let requests = fake.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].text, "Line one Line two");
        assert_eq!(requests[0].lang, "en");
    }

    #[tokio::test]
    async fn test_empty_text_is_rejected_without_provider_call() {
        let fake = Arc::new(FakeSpeechSynthesizer::new());
        let narration = NarrationGenerator::new(fake.clone(), "en");

        let result = narration.synthesize(" \n ").await;
        assert!(matches!(result, Err(NarrationError::EmptyText)));
        assert!(fake.requests().is_empty());
    }

    #[tokio::test]
    async fn test_cache_avoids_second_synthesis() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Arc::new(SledNarrationCache::open(dir.path()).unwrap());
        let fake = Arc::new(FakeSpeechSynthesizer::new());
        let narration = NarrationGenerator::new(fake.clone(), "en").with_cache(cache);

        let first = narration.synthesize("Same text").await.unwrap();
        let second = narration.synthesize("Same text").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(fake.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_provider_failure_is_narration_error() {
        let narration = NarrationGenerator::new(Arc::new(FakeSpeechSynthesizer::failing()), "en");
        let result = narration.synthesize("Hello").await;
        assert!(matches!(result, Err(NarrationError::Provider(_))));
    }
}
