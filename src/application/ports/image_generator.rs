//! Image Generator Port - 图像生成服务抽象
//!
//! TextToImage(prompt, width, height) -> imageRef

use async_trait::async_trait;

use super::ProviderError;
use crate::domain::book::ImageRef;

/// 图像生成请求
#[derive(Debug, Clone)]
pub struct ImageRequest {
    pub prompt: String,
    pub width: u32,
    pub height: u32,
}

/// Image Generator Port
#[async_trait]
pub trait ImageGeneratorPort: Send + Sync {
    /// 根据提示词生成图像
    async fn text_to_image(&self, request: ImageRequest) -> Result<ImageRef, ProviderError>;
}
