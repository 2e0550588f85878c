//! Book Context - Entities

use serde::{Deserialize, Serialize};

/// 章节
///
/// 不变量:
/// - index 与大纲位置一致，从 0 开始连续
/// - audio 为 None 表示该章没有朗读音频（朗读失败或未启用）
/// - illustration 只出现在小说章节中
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    index: usize,
    title: String,
    text: String,
    audio: Option<Vec<u8>>,
    illustration: Option<ImageRef>,
}

impl Chapter {
    pub fn new(index: usize, title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            index,
            title: title.into(),
            text: text.into(),
            audio: None,
            illustration: None,
        }
    }

    pub fn with_audio(mut self, audio: Option<Vec<u8>>) -> Self {
        self.audio = audio.filter(|a| !a.is_empty());
        self
    }

    pub fn with_illustration(mut self, illustration: Option<ImageRef>) -> Self {
        self.illustration = illustration;
        self
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// 从 1 开始的章节编号
    pub fn number(&self) -> usize {
        self.index + 1
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn audio(&self) -> Option<&[u8]> {
        self.audio.as_deref()
    }

    pub fn has_audio(&self) -> bool {
        self.audio.is_some()
    }

    pub fn illustration(&self) -> Option<&ImageRef> {
        self.illustration.as_ref()
    }

    pub fn has_illustration(&self) -> bool {
        self.illustration.is_some()
    }

    /// 章节标题行: "Chapter {n}: {title}"
    pub fn heading(&self) -> String {
        format!("Chapter {}: {}", self.number(), self.title)
    }
}

/// 图像引用：外部 URL 或已下载的字节
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageRef {
    Url(String),
    Bytes(Vec<u8>),
}

impl ImageRef {
    pub fn bytes(&self) -> Option<&[u8]> {
        match self {
            ImageRef::Bytes(data) => Some(data),
            ImageRef::Url(_) => None,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            ImageRef::Url(url) => Some(url),
            ImageRef::Bytes(_) => None,
        }
    }
}

/// 封面
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverImage {
    image: ImageRef,
    prompt: String,
}

impl CoverImage {
    pub fn new(image: ImageRef, prompt: impl Into<String>) -> Self {
        Self {
            image,
            prompt: prompt.into(),
        }
    }

    pub fn image(&self) -> &ImageRef {
        &self.image
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }
}

/// 角色（仅虚构类书籍）
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Character {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub personality: String,
    #[serde(default)]
    pub appearance: String,
}
