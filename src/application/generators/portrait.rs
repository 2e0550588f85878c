//! Portrait Generator - 角色肖像

use std::sync::Arc;

use super::prompts;
use crate::application::ports::{ImageGeneratorPort, ImageRequest, ProviderError};
use crate::domain::book::{Character, ImageRef};

pub struct PortraitGenerator {
    image: Arc<dyn ImageGeneratorPort>,
    width: u32,
    height: u32,
}

impl PortraitGenerator {
    pub fn new(image: Arc<dyn ImageGeneratorPort>, width: u32, height: u32) -> Self {
        Self {
            image,
            width,
            height,
        }
    }

    pub async fn generate_portrait(
        &self,
        character: &Character,
    ) -> Result<ImageRef, ProviderError> {
        let prompt = prompts::portrait_prompt(character);
        tracing::debug!(character = %character.name, "Requesting portrait");

        self.image
            .text_to_image(ImageRequest {
                prompt,
                width: self.width,
                height: self.height,
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::adapters::image::FakeImageGenerator;

    #[tokio::test]
    async fn test_portrait_request() {
        let fake = Arc::new(FakeImageGenerator::new());
        let generator = PortraitGenerator::new(fake.clone(), 512, 512);
        let lily = Character {
            name: "Lily".into(),
            appearance: "Red hair".into(),
            ..Default::default()
        };

        generator.generate_portrait(&lily).await.unwrap();

        let requests = fake.requests();
        assert_eq!((requests[0].width, requests[0].height), (512, 512));
        assert_eq!(requests[0].prompt, "Portrait of Lily based on appearance: Red hair");
    }

    #[tokio::test]
    async fn test_portrait_failure_is_reported() {
        let generator = PortraitGenerator::new(Arc::new(FakeImageGenerator::failing()), 512, 512);
        let result = generator.generate_portrait(&Character::default()).await;
        assert!(matches!(result, Err(ProviderError::Status { status: 402, .. })));
    }
}
