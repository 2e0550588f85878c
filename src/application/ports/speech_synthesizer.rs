//! Speech Synthesizer Port - 语音合成服务抽象
//!
//! TextToSpeech(text, lang) -> audioBytes，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;

use super::ProviderError;

/// 语音合成请求
#[derive(Debug, Clone)]
pub struct SpeechRequest {
    /// 要合成的文本内容
    pub text: String,
    /// 语言代码（如 "en"）
    pub lang: String,
}

/// Speech Synthesizer Port
///
/// 外部 TTS 服务的抽象接口
#[async_trait]
pub trait SpeechSynthesizerPort: Send + Sync {
    /// 合成语音，返回音频字节
    async fn synthesize(&self, request: SpeechRequest) -> Result<Vec<u8>, ProviderError>;
}
