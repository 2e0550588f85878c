//! Character Generator - 角色列表生成（仅虚构类）

use std::sync::Arc;

use thiserror::Error;

use super::prompts;
use crate::application::ports::{ChatRequest, ProviderError, TextGeneratorPort};
use crate::domain::book::{BookConfig, Character};
use crate::domain::Outline;

#[derive(Debug, Error)]
pub enum CharacterError {
    #[error("Text provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Cannot parse character list: {0}")]
    Parse(String),
}

/// 从模型输出中解析角色列表
///
/// 取第一个 `[` 到最后一个 `]` 之间的 JSON，忽略前后的说明文字
pub fn parse_characters(raw: &str) -> Result<Vec<Character>, CharacterError> {
    let start = raw
        .find('[')
        .ok_or_else(|| CharacterError::Parse("no JSON array found".to_string()))?;
    let end = raw
        .rfind(']')
        .filter(|end| *end > start)
        .ok_or_else(|| CharacterError::Parse("unterminated JSON array".to_string()))?;

    let characters: Vec<Character> = serde_json::from_str(&raw[start..=end])
        .map_err(|e| CharacterError::Parse(e.to_string()))?;

    Ok(characters
        .into_iter()
        .filter(|c| !c.name.trim().is_empty())
        .collect())
}

/// 解析单个角色：接受 JSON 对象，也接受只含一项的数组
pub fn parse_character(raw: &str) -> Result<Character, CharacterError> {
    let object = raw.find('{').zip(raw.rfind('}')).filter(|(start, end)| end > start);
    let array = raw.find('[').zip(raw.rfind(']')).filter(|(start, end)| end > start);

    let character = match (object, array) {
        (_, Some((start, _))) if object.map_or(true, |(first, _)| start < first) => {
            parse_characters(raw)?.into_iter().next()
        }
        (Some((start, end)), _) => {
            let character: Character = serde_json::from_str(&raw[start..=end])
                .map_err(|e| CharacterError::Parse(e.to_string()))?;
            Some(character).filter(|c| !c.name.trim().is_empty())
        }
        _ => return Err(CharacterError::Parse("no JSON object found".to_string())),
    };

    character.ok_or_else(|| CharacterError::Parse("character has no name".to_string()))
}

pub struct CharacterGenerator {
    text: Arc<dyn TextGeneratorPort>,
    model: String,
}

impl CharacterGenerator {
    pub fn new(text: Arc<dyn TextGeneratorPort>, model: impl Into<String>) -> Self {
        Self {
            text,
            model: model.into(),
        }
    }

    pub async fn generate_characters(
        &self,
        config: &BookConfig,
        outline: &Outline,
    ) -> Result<Vec<Character>, CharacterError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: prompts::characters_messages(config, &outline.to_numbered_text()),
        };
        let raw = self.text.complete(request).await?;
        parse_characters(&raw)
    }

    /// 为同一本书重新生成一个角色
    pub async fn regenerate_character(
        &self,
        config: &BookConfig,
        outline: &Outline,
        current: &Character,
    ) -> Result<Character, CharacterError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: prompts::regenerate_character_messages(
                config,
                &outline.to_numbered_text(),
                current,
            ),
        };
        let raw = self.text.complete(request).await?;
        parse_character(&raw)
    }
}
