//! Illustration Generator - 章节插图（仅小说）

use std::sync::Arc;

use super::prompts;
use crate::application::ports::{ImageGeneratorPort, ImageRequest, ProviderError};
use crate::domain::book::{BookConfig, Chapter, ImageRef};

pub struct IllustrationGenerator {
    image: Arc<dyn ImageGeneratorPort>,
    width: u32,
    height: u32,
}

impl IllustrationGenerator {
    pub fn new(image: Arc<dyn ImageGeneratorPort>, width: u32, height: u32) -> Self {
        Self {
            image,
            width,
            height,
        }
    }

    pub async fn illustrate(
        &self,
        config: &BookConfig,
        chapter: &Chapter,
    ) -> Result<ImageRef, ProviderError> {
        let prompt = prompts::illustration_prompt(config, chapter.text());
        tracing::debug!(
            chapter = chapter.number(),
            prompt = %prompt,
            "Requesting illustration"
        );

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
    use crate::domain::book::{BookType, Tone};
    use crate::infrastructure::adapters::image::FakeImageGenerator;

    #[tokio::test]
    async fn test_illustration_prompt_comes_from_chapter_text() {
        let fake = Arc::new(FakeImageGenerator::new());
        let generator = IllustrationGenerator::new(fake.clone(), 768, 1024);
        let config =
            BookConfig::new(BookType::Fiction, "Fantasy", Tone::Suspenseful, 3, None, None)
                .unwrap();
        let chapter = Chapter::new(1, "Into the Woods", "The trees closed in behind her.");

        let image = generator.illustrate(&config, &chapter).await.unwrap();
        assert!(image.bytes().is_some());

        let requests = fake.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].prompt.starts_with("The trees closed in behind her."));
        assert!(requests[0].prompt.contains("Fantasy illustration"));
    }
}
