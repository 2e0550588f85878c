//! Image Adapter - 图像生成服务客户端

mod fake_image_generator;
mod replicate_client;

pub use fake_image_generator::FakeImageGenerator;
pub use replicate_client::{ReplicateClient, ReplicateClientConfig};
