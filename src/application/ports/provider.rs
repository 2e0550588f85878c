//! Provider Error - 外部生成服务的统一错误
//!
//! 文本、图像、语音三类服务共用

use thiserror::Error;

/// 外部服务错误
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Provider returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Generation failed: {0}")]
    Failed(String),
}

impl ProviderError {
    /// 是否为瞬时错误（可重试）
    ///
    /// 网络错误、超时、429 和 5xx 视为瞬时错误
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Network(_) | ProviderError::Timeout => true,
            ProviderError::Status { status, .. } => *status == 429 || *status >= 500,
            ProviderError::InvalidResponse(_) | ProviderError::Failed(_) => false,
        }
    }

    /// 从 reqwest 错误转换
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else if err.is_connect() {
            ProviderError::Network(format!("Cannot connect to provider: {}", err))
        } else if err.is_decode() {
            ProviderError::InvalidResponse(err.to_string())
        } else {
            ProviderError::Network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(ProviderError::Timeout.is_retryable());
        assert!(ProviderError::Network("reset".into()).is_retryable());
        assert!(ProviderError::Status { status: 429, message: String::new() }.is_retryable());
        assert!(ProviderError::Status { status: 503, message: String::new() }.is_retryable());
        assert!(!ProviderError::Status { status: 401, message: String::new() }.is_retryable());
        assert!(!ProviderError::InvalidResponse("bad json".into()).is_retryable());
    }
}
