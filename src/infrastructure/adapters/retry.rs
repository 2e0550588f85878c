//! Retry - 外部服务调用的指数退避重试
//!
//! 只有瞬时错误（网络、超时、429、5xx）会重试

use std::future::Future;
use std::time::Duration;

use tokio_retry2::strategy::{jitter, ExponentialBackoff};
use tokio_retry2::{Retry, RetryError};

use crate::application::ports::ProviderError;

/// 重试策略
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// 首次失败后的最大重试次数（0 表示不重试）
    pub max_retries: usize,
    /// 第一次重试前的等待（毫秒），之后每次翻倍
    pub initial_delay_ms: u64,
    /// 单次等待上限
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay_ms: 500,
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: usize) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    pub fn none() -> Self {
        Self::new(0)
    }

    pub fn with_initial_delay_ms(mut self, ms: u64) -> Self {
        self.initial_delay_ms = ms;
        self
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// 未加抖动的等待序列：initial, 2×initial, 4×initial ...，不超过 max_delay
    ///
    /// ExponentialBackoff 的第 n 次等待为 factor × base^n，
    /// 取 base = 2、factor = initial / 2 得到翻倍序列
    fn backoff(&self) -> impl Iterator<Item = Duration> {
        ExponentialBackoff::from_millis(2)
            .factor((self.initial_delay_ms / 2).max(1))
            .max_delay(self.max_delay)
            .take(self.max_retries)
    }
}

/// 按策略执行并在瞬时错误时重试
pub async fn with_retry<T, F, Fut>(
    policy: RetryPolicy,
    operation_name: &str,
    operation: F,
) -> Result<T, ProviderError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let strategy = policy.backoff().map(jitter);

    Retry::spawn(strategy, || async {
        match operation().await {
            Ok(value) => Ok(value),
            Err(e) if e.is_retryable() => {
                tracing::warn!(
                    operation = operation_name,
                    error = %e,
                    "Transient provider error, will retry"
                );
                Err(RetryError::Transient {
                    err: e,
                    retry_after: None,
                })
            }
            Err(e) => {
                tracing::warn!(
                    operation = operation_name,
                    error = %e,
                    "Permanent provider error, failing immediately"
                );
                Err(RetryError::Permanent(e))
            }
        }
    })
    .await
}
