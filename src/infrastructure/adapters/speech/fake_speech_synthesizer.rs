//! Fake Speech Synthesizer - 用于测试的 TTS 服务
//!
//! 不实际调用 TTS 服务，返回由文本派生的伪音频

use async_trait::async_trait;
use std::sync::Mutex;

use crate::application::ports::{ProviderError, SpeechRequest, SpeechSynthesizerPort};

/// Fake Speech Synthesizer
pub struct FakeSpeechSynthesizer {
    fail: bool,
    requests: Mutex<Vec<SpeechRequest>>,
}

impl FakeSpeechSynthesizer {
    pub fn new() -> Self {
        Self {
            fail: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// 始终返回超时错误
    pub fn failing() -> Self {
        Self {
            fail: true,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<SpeechRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl Default for FakeSpeechSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechSynthesizerPort for FakeSpeechSynthesizer {
    async fn synthesize(&self, request: SpeechRequest) -> Result<Vec<u8>, ProviderError> {
        let audio = format!("ID3 {}:{}", request.lang, request.text).into_bytes();
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }

        if self.fail {
            return Err(ProviderError::Timeout);
        }

        tracing::debug!(audio_size = audio.len(), "FakeSpeechSynthesizer: returning fake audio");
        Ok(audio)
    }
}
