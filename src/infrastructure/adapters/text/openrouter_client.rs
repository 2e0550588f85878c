//! OpenRouter Client - OpenAI 兼容的 Chat Completion 接口
//!
//! POST {url}
//! Request: {"model": "...", "messages": [...], "temperature": 0.9, "max_tokens": 1800}
//! Response: {"choices": [{"message": {"content": "..."}}]}

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::application::ports::{ChatMessage, ChatRequest, ProviderError, TextGeneratorPort};
use crate::infrastructure::adapters::retry::{with_retry, RetryPolicy};

#[derive(Debug, Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenRouter 客户端配置
#[derive(Debug, Clone)]
pub struct OpenRouterClientConfig {
    /// Chat Completion 完整 URL
    pub url: String,
    pub api_key: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
    pub retry: RetryPolicy,
    /// 可选的 HTTP-Referer / X-Title 头
    pub referer: Option<String>,
    pub app_title: Option<String>,
}

impl Default for OpenRouterClientConfig {
    fn default() -> Self {
        Self {
            url: "https://openrouter.ai/api/v1/chat/completions".to_string(),
            api_key: String::new(),
            temperature: 0.9,
            max_tokens: 1800,
            timeout_secs: 120,
            retry: RetryPolicy::default(),
            referer: None,
            app_title: None,
        }
    }
}

/// OpenRouter 客户端
pub struct OpenRouterClient {
    client: Client,
    config: OpenRouterClientConfig,
}

impl OpenRouterClient {
    pub fn new(config: OpenRouterClientConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(Self { client, config })
    }

    async fn send_once(&self, request: &ChatRequest) -> Result<String, ProviderError> {
        let body = ChatCompletionBody {
            model: &request.model,
            messages: &request.messages,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let mut builder = self
            .client
            .post(&self.config.url)
            .bearer_auth(&self.config.api_key)
            .json(&body);
        if let Some(referer) = &self.config.referer {
            builder = builder.header("HTTP-Referer", referer);
        }
        if let Some(title) = &self.config.app_title {
            builder = builder.header("X-Title", title);
        }

        let response = builder.send().await.map_err(ProviderError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| ProviderError::InvalidResponse("response contained no choices".into()))
    }
}

#[async_trait]
impl TextGeneratorPort for OpenRouterClient {
    async fn complete(&self, request: ChatRequest) -> Result<String, ProviderError> {
        tracing::debug!(
            url = %self.config.url,
            model = %request.model,
            messages = request.messages.len(),
            "Sending chat completion request"
        );

        let text = with_retry(self.config.retry, "chat_completion", || self.send_once(&request))
            .await?;

        tracing::info!(model = %request.model, chars = text.len(), "Chat completion finished");
        Ok(text)
    }
}
