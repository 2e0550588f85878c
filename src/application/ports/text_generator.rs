//! Text Generator Port - 文本生成服务抽象
//!
//! ChatCompletion(model, messages) -> text，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::ProviderError;

/// 消息角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// 对话消息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// 文本生成请求
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// 模型标识
    pub model: String,
    /// 有序消息列表
    pub messages: Vec<ChatMessage>,
}

/// Text Generator Port
#[async_trait]
pub trait TextGeneratorPort: Send + Sync {
    /// 执行一次对话补全，返回生成的文本
    async fn complete(&self, request: ChatRequest) -> Result<String, ProviderError>;
}
