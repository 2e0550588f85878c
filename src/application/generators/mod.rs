//! Generators - 基于外部服务的内容生成
//!
//! 每个生成器只依赖一个出站端口

mod characters;
mod content;
mod cover;
mod illustration;
mod narration;
mod portrait;
pub mod prompts;

pub use characters::{parse_character, parse_characters, CharacterError, CharacterGenerator};
pub use content::ContentGenerator;
pub use cover::CoverGenerator;
pub use illustration::IllustrationGenerator;
pub use narration::{flatten_for_speech, NarrationError, NarrationGenerator};
pub use portrait::PortraitGenerator;
