//! Text Adapter - 文本生成服务客户端

mod fake_text_generator;
mod openrouter_client;

pub use fake_text_generator::FakeTextGenerator;
pub use openrouter_client::{OpenRouterClient, OpenRouterClientConfig};
