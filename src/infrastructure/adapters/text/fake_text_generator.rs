//! Fake Text Generator - 用于测试的文本生成服务
//!
//! 记录每次请求，并由调用方提供的闭包决定返回内容

use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

use crate::application::ports::{ChatRequest, ProviderError, TextGeneratorPort};

type Responder = dyn Fn(usize, &ChatRequest) -> Result<String, ProviderError> + Send + Sync;
type Latency = dyn Fn(&ChatRequest) -> Duration + Send + Sync;

/// Fake Text Generator
pub struct FakeTextGenerator {
    responder: Box<Responder>,
    latency: Option<Box<Latency>>,
    calls: Mutex<Vec<ChatRequest>>,
}

impl FakeTextGenerator {
    /// responder 收到调用序号（0 起）和请求
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(usize, &ChatRequest) -> Result<String, ProviderError> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            latency: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// 按顺序返回预设结果，用完后返回错误
    pub fn scripted(responses: Vec<Result<String, ProviderError>>) -> Self {
        Self::new(move |call, _| {
            responses.get(call).cloned().unwrap_or_else(|| {
                Err(ProviderError::Failed(format!("no scripted response for call {}", call)))
            })
        })
    }

    /// 为每次请求加入模拟延迟
    pub fn with_latency<F>(mut self, latency: F) -> Self
    where
        F: Fn(&ChatRequest) -> Duration + Send + Sync + 'static,
    {
        self.latency = Some(Box::new(latency));
        self
    }

    pub fn calls(&self) -> Vec<ChatRequest> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or_default()
    }
}

#[async_trait]
impl TextGeneratorPort for FakeTextGenerator {
    async fn complete(&self, request: ChatRequest) -> Result<String, ProviderError> {
        let call = match self.calls.lock() {
            Ok(mut calls) => {
                calls.push(request.clone());
                calls.len() - 1
            }
            Err(_) => return Err(ProviderError::Failed("call log poisoned".into())),
        };

        if let Some(latency) = &self.latency {
            let delay = latency(&request);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        tracing::debug!(call = call, model = %request.model, "FakeTextGenerator: responding");
        (self.responder)(call, &request)
    }
}
