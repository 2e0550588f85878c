//! Document Model - 所有导出格式共用的逻辑文档
//!
//! 标题页（书名 + 副标题），之后每章一个标题 "Chapter {n}: {title}" 加正文段落

use crate::domain::book::Book;

/// 章节段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub number: usize,
    pub heading: String,
    pub paragraphs: Vec<String>,
}

/// 逻辑文档
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentModel {
    pub title: String,
    pub subtitle: String,
    pub sections: Vec<Section>,
}

/// 把正文拆成段落：每个非空行一段，行内空白压缩为单个空格
pub fn split_paragraphs(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect()
}

impl DocumentModel {
    pub fn from_book(book: &Book) -> Self {
        Self {
            title: book.title().to_string(),
            subtitle: book.subtitle(),
            sections: book
                .chapters()
                .iter()
                .map(|chapter| Section {
                    number: chapter.number(),
                    heading: chapter.heading(),
                    paragraphs: split_paragraphs(chapter.text()),
                })
                .collect(),
        }
    }

    /// 按阅读顺序排列的全部文本块
    pub fn blocks(&self) -> Vec<&str> {
        let mut blocks = vec![self.title.as_str(), self.subtitle.as_str()];
        for section in &self.sections {
            blocks.push(&section.heading);
            blocks.extend(section.paragraphs.iter().map(String::as_str));
        }
        blocks
    }
}
