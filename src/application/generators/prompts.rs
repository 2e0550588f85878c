//! Prompts - 提示词模板
//!
//! 所有提示词都是 BookConfig 的确定性函数

use crate::application::ports::ChatMessage;
use crate::domain::book::{BookConfig, BookType, Character};

const FICTION_SYSTEM: &str =
    "You are a professional novelist and ghostwriter. You write original, coherent fiction.";
const NON_FICTION_SYSTEM: &str =
    "You are an expert non-fiction author. You write clear, practical and well-structured books.";

/// 封面提示词中描述片段的最大长度
pub const COVER_PREMISE_MAX_CHARS: usize = 100;

/// 插图提示词取章节开头的字符数
pub const ILLUSTRATION_EXCERPT_CHARS: usize = 200;

fn system_message(config: &BookConfig) -> ChatMessage {
    match config.book_type() {
        BookType::Fiction => ChatMessage::system(FICTION_SYSTEM),
        BookType::NonFiction => ChatMessage::system(NON_FICTION_SYSTEM),
    }
}

/// 大纲提示词
pub fn outline_messages(config: &BookConfig) -> Vec<ChatMessage> {
    let count = config.chapter_count();
    let user = match config.book_type() {
        BookType::Fiction => format!(
            "Create a chapter outline for a {tone} {genre} novel titled \"{title}\" with exactly \
             {count} chapters.\nPremise: {premise}\nInclude the major plot points and character \
             arcs in your planning, but respond only with the chapter titles, one per line, \
             numbered like \"1. Title\".",
            tone = config.tone().phrase(),
            genre = config.genre(),
            title = config.title(),
            premise = config.effective_description(),
        ),
        BookType::NonFiction => format!(
            "Write a non-fiction outline for a book about {genre} titled \"{title}\" with exactly \
             {count} chapters.\nTopic: {premise}\nThe book should be written in a {tone} tone. \
             Respond only with the chapter titles, one per line, numbered like \"1. Title\".",
            genre = config.genre(),
            title = config.title(),
            premise = config.effective_description(),
            tone = config.tone().phrase(),
        ),
    };

    vec![system_message(config), ChatMessage::user(user)]
}

/// 章节提示词
pub fn chapter_messages(config: &BookConfig, index: usize, title: &str) -> Vec<ChatMessage> {
    let number = index + 1;
    let total = config.chapter_count();
    let user = match config.book_type() {
        BookType::Fiction => format!(
            "Write the full text of chapter {number} of {total}, \"{chapter}\", of the {genre} \
             novel \"{title}\".\nPremise: {premise}\nUse a {tone} style. Return only the chapter \
             prose, without the chapter heading.",
            chapter = title,
            genre = config.genre(),
            title = config.title(),
            premise = config.effective_description(),
            tone = config.tone().phrase(),
        ),
        BookType::NonFiction => format!(
            "Write the full content of chapter {number} of {total}, \"{chapter}\", for a \
             non-fiction book about {genre} titled \"{title}\".\nTopic: {premise}\nUse a {tone} \
             writing style. Return only the chapter body, without the chapter heading.",
            chapter = title,
            genre = config.genre(),
            title = config.title(),
            premise = config.effective_description(),
            tone = config.tone().phrase(),
        ),
    };

    vec![system_message(config), ChatMessage::user(user)]
}

/// 角色提示词（仅虚构类）
pub fn characters_messages(config: &BookConfig, outline_text: &str) -> Vec<ChatMessage> {
    let user = format!(
        "Create the main characters for a {tone} {genre} novel based on this outline.\n\
         Return only a JSON list like:\n\
         [{{\"name\": \"X\", \"role\": \"Y\", \"personality\": \"...\", \"appearance\": \"...\"}}]\n\
         Outline:\n{outline}",
        tone = config.tone().phrase(),
        genre = config.genre(),
        outline = outline_text,
    );

    vec![system_message(config), ChatMessage::user(user)]
}

/// 重新生成单个角色，要求返回一个 JSON 对象
pub fn regenerate_character_messages(
    config: &BookConfig,
    outline_text: &str,
    current: &Character,
) -> Vec<ChatMessage> {
    let user = format!(
        "Regenerate a single character for this {tone} {genre} novel, replacing \"{name}\" \
         ({role}) with someone new.\n\
         Return only one JSON object like:\n\
         {{\"name\": \"X\", \"role\": \"Y\", \"personality\": \"...\", \"appearance\": \"...\"}}\n\
         Outline:\n{outline}",
        tone = config.tone().phrase(),
        genre = config.genre(),
        name = current.name,
        role = current.role,
        outline = outline_text,
    );

    vec![system_message(config), ChatMessage::user(user)]
}

/// 描述的第一句（第一个句号之前），最多 100 个字符
pub fn premise_excerpt(description: &str) -> String {
    let first = description.split('.').next().unwrap_or_default().trim();
    first.chars().take(COVER_PREMISE_MAX_CHARS).collect()
}

/// 封面提示词
pub fn cover_prompt(config: &BookConfig) -> String {
    let premise = premise_excerpt(config.effective_description());
    let kind = match config.book_type() {
        BookType::Fiction => "novel",
        BookType::NonFiction => "non-fiction book",
    };
    let mut prompt = format!(
        "Cover art for a {genre} {kind} titled \"{title}\"",
        genre = config.genre(),
        title = config.title(),
    );
    if !premise.is_empty() {
        prompt.push_str(": ");
        prompt.push_str(&premise);
    }
    prompt.push_str(". Highly detailed, cinematic lighting, no text, no watermark.");
    prompt
}

/// 章节插图提示词：章节开头加语气描述
pub fn illustration_prompt(config: &BookConfig, chapter_text: &str) -> String {
    let excerpt: String = chapter_text
        .trim()
        .chars()
        .take(ILLUSTRATION_EXCERPT_CHARS)
        .collect();
    format!(
        "{excerpt} Style: {tone} {genre} illustration, no text.",
        tone = config.tone().phrase(),
        genre = config.genre(),
    )
}

pub fn portrait_prompt(character: &Character) -> String {
    let mut prompt = format!("Portrait of {}", character.name.trim());
    let appearance = character.appearance.trim();
    if !appearance.is_empty() {
        prompt.push_str(" based on appearance: ");
        prompt.push_str(appearance);
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::ChatRole;
    use crate::domain::book::Tone;

    fn fiction() -> BookConfig {
        BookConfig::new(
            BookType::Fiction,
            "Fantasy",
            Tone::Default,
            3,
            Some("The Enchanted Forest".into()),
            Some("A young girl discovers a magical forest. She must save it.".into()),
        )
        .unwrap()
    }

    #[test]
    fn test_outline_messages_are_system_then_user() {
        let messages = outline_messages(&fiction());
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, ChatRole::System);
        assert_eq!(messages[1].role, ChatRole::User);
        assert!(messages[1].content.contains("exactly 3 chapters"));
        assert!(messages[1].content.contains("engaging, vivid, well-paced"));
        assert!(messages[1].content.contains("Fantasy"));
    }

    #[test]
    fn test_prompts_are_deterministic() {
        let config = fiction();
        assert_eq!(
            chapter_messages(&config, 1, "Into the Woods"),
            chapter_messages(&config, 1, "Into the Woods")
        );
        assert!(chapter_messages(&config, 1, "Into the Woods")[1]
            .content
            .contains("chapter 2 of 3"));
    }

    #[test]
    fn test_non_fiction_uses_its_own_wording() {
        let config = BookConfig::new(
            BookType::NonFiction,
            "Productivity",
            Tone::Default,
            4,
            None,
            None,
        )
        .unwrap();
        let messages = outline_messages(&config);
        assert!(messages[1].content.contains("non-fiction outline"));
        // 描述为空时使用标题
        assert!(messages[1].content.contains("Topic: Untitled"));
    }

    #[test]
    fn test_premise_excerpt() {
        assert_eq!(
            premise_excerpt("A young girl discovers a magical forest. She must save it."),
            "A young girl discovers a magical forest"
        );
        let long = "x".repeat(250);
        assert_eq!(premise_excerpt(&long).chars().count(), 100);
        assert_eq!(premise_excerpt(""), "");
    }

    #[test]
    fn test_cover_prompt_mentions_genre_and_title() {
        let prompt = cover_prompt(&fiction());
        assert!(
            prompt.starts_with("Cover art for a Fantasy novel titled \"The Enchanted Forest\"")
        );
        assert!(prompt.contains("magical forest"));
        assert!(!prompt.contains("She must"));
    }

    #[test]
    fn test_illustration_prompt_uses_chapter_opening() {
        let text = format!("Lily stepped into the clearing. {}", "a".repeat(400));
        let prompt = illustration_prompt(&fiction(), &text);
        assert!(prompt.starts_with("Lily stepped into the clearing."));
        assert!(prompt.contains("engaging, vivid, well-paced Fantasy"));
        // 前缀 32 个字符，之后只剩 168 个 a
        assert!(prompt.contains(&format!("{} Style:", "a".repeat(168))));
        assert!(!prompt.contains(&"a".repeat(169)));
    }

    #[test]
    fn test_portrait_and_regenerate_prompts() {
        let lily = Character {
            name: "Lily".into(),
            role: "Protagonist".into(),
            personality: String::new(),
            appearance: "Red hair, green cloak".into(),
        };
        assert_eq!(
            portrait_prompt(&lily),
            "Portrait of Lily based on appearance: Red hair, green cloak"
        );
        let nameless = Character {
            name: "Oakheart".into(),
            ..Default::default()
        };
        assert_eq!(portrait_prompt(&nameless), "Portrait of Oakheart");

        let messages = regenerate_character_messages(&fiction(), "1. The Call", &lily);
        assert_eq!(messages[0].role, ChatRole::System);
        assert!(messages[1].content.contains("replacing \"Lily\" (Protagonist)"));
        assert!(messages[1].content.ends_with("Outline:\n1. The Call"));
    }
}
