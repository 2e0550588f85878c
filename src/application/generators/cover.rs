//! Cover Generator - 封面生成

use std::sync::Arc;

use super::prompts;
use crate::application::ports::{ImageGeneratorPort, ImageRequest, ProviderError};
use crate::domain::book::{BookConfig, CoverImage};

/// 封面生成器
pub struct CoverGenerator {
    image: Arc<dyn ImageGeneratorPort>,
    width: u32,
    height: u32,
}

impl CoverGenerator {
    pub fn new(image: Arc<dyn ImageGeneratorPort>, width: u32, height: u32) -> Self {
        Self {
            image,
            width,
            height,
        }
    }

    pub async fn generate_cover(&self, config: &BookConfig) -> Result<CoverImage, ProviderError> {
        let prompt = prompts::cover_prompt(config);
        tracing::debug!(
            width = self.width,
            height = self.height,
            prompt = %prompt,
            "Requesting cover"
        );

        let image = self
            .image
            .text_to_image(ImageRequest {
                prompt: prompt.clone(),
                width: self.width,
                height: self.height,
            })
            .await?;

        Ok(CoverImage::new(image, prompt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::book::{BookType, Tone};
    use crate::infrastructure::adapters::image::FakeImageGenerator;

    #[tokio::test]
    async fn test_cover_uses_configured_size() {
        let fake = Arc::new(FakeImageGenerator::new());
        let generator = CoverGenerator::new(fake.clone(), 768, 1024);
        let config = BookConfig::new(BookType::Fiction, "Horror", Tone::Default, 3, None, None)
            .unwrap();

        let cover = generator.generate_cover(&config).await.unwrap();
        assert!(cover.image().bytes().is_some());

        let requests = fake.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!((requests[0].width, requests[0].height), (768, 1024));
        assert!(requests[0].prompt.contains("Horror"));
    }
}
