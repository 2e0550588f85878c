//! 大纲解析器
//!
//! 把文本生成服务返回的自由文本转换为有序的章节标题列表。
//! 不做语义校验：输入是垃圾，输出也是垃圾。

use serde::{Deserialize, Serialize};

/// 大纲：有序的章节标题列表
///
/// 不变量: 解析后不再修改，长度不超过请求的章节数
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outline {
    titles: Vec<String>,
}

impl Outline {
    /// 解析原始大纲文本，最多保留 `max_chapters` 个标题
    pub fn parse(raw: &str, max_chapters: usize) -> Self {
        let titles = raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(parse_title_line)
            .take(max_chapters)
            .collect();
        Self { titles }
    }

    pub fn from_titles(titles: Vec<String>) -> Self {
        Self { titles }
    }

    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    /// 以 "1. Title" 的形式渲染
    pub fn to_numbered_text(&self) -> String {
        self.titles
            .iter()
            .enumerate()
            .map(|(i, title)| format!("{}. {}", i + 1, title))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// 解析单行标题
///
/// 以数字开头时去掉 "<number>." 标记以及随后的标点和空白，否则整行作为标题
fn parse_title_line(line: &str) -> String {
    if !line.starts_with(|c: char| c.is_ascii_digit()) {
        return line.to_string();
    }

    let rest = line.trim_start_matches(|c: char| c.is_ascii_digit());
    let rest = rest.strip_prefix('.').unwrap_or(rest);
    rest.trim_start_matches(|c: char| c.is_ascii_punctuation() || c.is_whitespace())
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbered_outline() {
        let outline = Outline::parse("1. The Call\n2. Into the Woods\n3. The Return", 3);
        assert_eq!(
            outline.titles(),
            &["The Call", "Into the Woods", "The Return"]
        );
    }

    #[test]
    fn test_empty_output_yields_empty_outline() {
        assert!(Outline::parse("", 5).is_empty());
        assert!(Outline::parse("\n  \n\t\n", 5).is_empty());
    }

    #[test]
    fn test_length_is_min_of_lines_and_requested() {
        let raw = "A\n\nB\nC\n  \nD\nE";
        for requested in 0..8 {
            assert_eq!(Outline::parse(raw, requested).len(), requested.min(5));
        }
    }

    #[test]
    fn test_clean_titles_are_unchanged() {
        let titles = vec![
            "The Call".to_string(),
            "Into the Woods".to_string(),
            "The Return".to_string(),
        ];
        let outline = Outline::parse(&titles.join("\n"), 10);
        assert_eq!(outline.titles(), titles.as_slice());

        let reparsed = Outline::parse(&outline.titles().join("\n"), 10);
        assert_eq!(reparsed, outline);
    }

    #[test]
    fn test_marker_punctuation_is_stripped() {
        let outline = Outline::parse("1.  - The Call\n12) Twelve\n3: Third", 5);
        assert_eq!(outline.titles(), &["The Call", "Twelve", "Third"]);
    }

    #[test]
    fn test_non_numbered_lines_kept_whole() {
        let outline = Outline::parse("Chapter One: Dawn\n- Dusk", 5);
        assert_eq!(outline.titles(), &["Chapter One: Dawn", "- Dusk"]);
    }

    #[test]
    fn test_numbered_text_rendering() {
        let outline = Outline::from_titles(vec!["A".into(), "B".into()]);
        assert_eq!(outline.to_numbered_text(), "1. A\n2. B");
    }
}
