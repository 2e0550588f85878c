//! Speech Adapter - HTTP TTS 客户端实现

mod fake_speech_synthesizer;
mod http_tts_client;

pub use fake_speech_synthesizer::FakeSpeechSynthesizer;
pub use http_tts_client::{HttpTtsClient, HttpTtsClientConfig};
