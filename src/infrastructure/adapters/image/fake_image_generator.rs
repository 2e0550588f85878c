//! Fake Image Generator - 用于测试的图像生成服务

use async_trait::async_trait;
use std::sync::Mutex;

use crate::application::ports::{ImageGeneratorPort, ImageRequest, ProviderError};
use crate::domain::book::ImageRef;

/// 最小的 PNG 文件头
const FAKE_PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Fake Image Generator
///
/// 返回固定的 PNG 字节，或始终失败
pub struct FakeImageGenerator {
    fail: bool,
    requests: Mutex<Vec<ImageRequest>>,
}

impl FakeImageGenerator {
    pub fn new() -> Self {
        Self {
            fail: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ImageRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl Default for FakeImageGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageGeneratorPort for FakeImageGenerator {
    async fn text_to_image(&self, request: ImageRequest) -> Result<ImageRef, ProviderError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }

        if self.fail {
            return Err(ProviderError::Status {
                status: 402,
                message: "insufficient credit".to_string(),
            });
        }

        tracing::debug!("FakeImageGenerator: returning fixed image");
        Ok(ImageRef::Bytes(FAKE_PNG.to_vec()))
    }
}
