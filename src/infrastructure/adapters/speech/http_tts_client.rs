//! HTTP TTS Client - 调用外部 TTS HTTP 服务
//!
//! 实现 SpeechSynthesizerPort trait，通过 HTTP 调用外部 TTS 服务
//!
//! 外部 TTS API:
//! POST {base_url}/api/tts
//! Request: {"text": "...", "lang": "en"}  (JSON)
//! Response: 音频二进制（mp3 / wav）

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::application::ports::{ProviderError, SpeechRequest, SpeechSynthesizerPort};
use crate::infrastructure::adapters::retry::{with_retry, RetryPolicy};

/// TTS 请求体 (JSON)
#[derive(Debug, Serialize)]
struct TtsHttpRequest<'a> {
    text: &'a str,
    lang: &'a str,
}

/// HTTP TTS 客户端配置
#[derive(Debug, Clone)]
pub struct HttpTtsClientConfig {
    /// TTS 服务基础 URL
    pub base_url: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
    pub retry: RetryPolicy,
}

impl Default for HttpTtsClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 120,
            retry: RetryPolicy::none(),
        }
    }
}

impl HttpTtsClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// HTTP TTS 客户端
pub struct HttpTtsClient {
    client: Client,
    config: HttpTtsClientConfig,
}

impl HttpTtsClient {
    pub fn new(config: HttpTtsClientConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn tts_url(&self) -> String {
        format!("{}/api/tts", self.config.base_url.trim_end_matches('/'))
    }

    async fn synthesize_once(&self, request: &SpeechRequest) -> Result<Vec<u8>, ProviderError> {
        let response = self
            .client
            .post(self.tts_url())
            .json(&TtsHttpRequest {
                text: &request.text,
                lang: &request.lang,
            })
            .send()
            .await
            .map_err(ProviderError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                message,
            });
        }

        // 直接获取音频字节
        let audio = response
            .bytes()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to read audio: {}", e)))?
            .to_vec();
        Ok(audio)
    }
}

#[async_trait]
impl SpeechSynthesizerPort for HttpTtsClient {
    async fn synthesize(&self, request: SpeechRequest) -> Result<Vec<u8>, ProviderError> {
        tracing::debug!(
            url = %self.tts_url(),
            text_len = request.text.len(),
            lang = %request.lang,
            "Sending TTS request"
        );

        let audio = with_retry(self.config.retry, "text_to_speech", || {
            self.synthesize_once(&request)
        })
        .await?;

        tracing::info!(audio_size = audio.len(), "TTS synthesis completed");
        Ok(audio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::post;
    use axum::{Json, Router};

    #[test]
    fn test_config_default() {
        let config = HttpTtsClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.timeout_secs, 120);
        assert_eq!(config.retry.max_retries, 0);
    }

    #[test]
    fn test_config_builder() {
        let config = HttpTtsClientConfig::new("http://example.com:9000/").with_timeout(60);
        let client = HttpTtsClient::new(config).unwrap();
        assert_eq!(client.tts_url(), "http://example.com:9000/api/tts");
        assert_eq!(client.config.timeout_secs, 60);
    }

    #[tokio::test]
    async fn test_synthesize_returns_body_bytes() {
        let router = Router::new()
            .route(
                "/api/tts",
                post(|Json(body): Json<serde_json::Value>| async move {
                    assert_eq!(body["lang"], "en");
                    format!("ID3:{}", body["text"].as_str().unwrap_or_default()).into_bytes()
                }),
            );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let client = HttpTtsClient::new(HttpTtsClientConfig::new(base)).unwrap();

        let audio = client
            .synthesize(SpeechRequest {
                text: "Hello".into(),
                lang: "en".into(),
            })
            .await
            .unwrap();
        assert_eq!(audio, b"ID3:Hello");
    }
}
