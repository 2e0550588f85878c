//! PDF Serializer - 基于 lopdf 的 PDF 导出
//!
//! 默认使用 PDF 内置的 Helvetica（WinAnsiEncoding），无需外部字体文件。
//! 文本含 WinAnsi 无法表示的字符时改用嵌入的 TrueType 字体（Type0 / Identity-H），
//! 并附带 ToUnicode 映射，复制或提取出的文本与原文一致

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};

use super::document::DocumentModel;
use super::font::{UnicodeFont, DEFAULT_GLYPH_WIDTH};
use crate::application::ports::{BookSerializerPort, ExportError, ExportFormat};
use crate::domain::book::Book;

// A4，单位 pt
const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN: i64 = 72;

const TITLE_SIZE: i64 = 28;
const SUBTITLE_SIZE: i64 = 14;
const HEADING_SIZE: i64 = 18;
const BODY_SIZE: i64 = 11;
const BODY_LEADING: i64 = 16;
const PARAGRAPH_GAP: i64 = 6;

const REGULAR: &[u8] = b"F1";
const BOLD: &[u8] = b"F2";

const UNICODE_FONT_NAME: &str = "StoryloomUnicode";

/// WinAnsiEncoding 中 0x80-0x9F 区间的字符，其余字节与 Latin-1 相同
const WIN_ANSI_HIGH: [(u8, char); 27] = [
    (0x80, '\u{20ac}'),
    (0x82, '\u{201a}'),
    (0x83, '\u{0192}'),
    (0x84, '\u{201e}'),
    (0x85, '\u{2026}'),
    (0x86, '\u{2020}'),
    (0x87, '\u{2021}'),
    (0x88, '\u{02c6}'),
    (0x89, '\u{2030}'),
    (0x8a, '\u{0160}'),
    (0x8b, '\u{2039}'),
    (0x8c, '\u{0152}'),
    (0x8e, '\u{017d}'),
    (0x91, '\u{2018}'),
    (0x92, '\u{2019}'),
    (0x93, '\u{201c}'),
    (0x94, '\u{201d}'),
    (0x95, '\u{2022}'),
    (0x96, '\u{2013}'),
    (0x97, '\u{2014}'),
    (0x98, '\u{02dc}'),
    (0x99, '\u{2122}'),
    (0x9a, '\u{0161}'),
    (0x9b, '\u{203a}'),
    (0x9c, '\u{0153}'),
    (0x9e, '\u{017e}'),
    (0x9f, '\u{0178}'),
];

fn win_ansi_byte(c: char) -> Option<u8> {
    match c {
        ' '..='~' | '\u{a0}'..='\u{ff}' => Some(c as u32 as u8),
        '\t' => Some(b' '),
        _ => WIN_ANSI_HIGH
            .iter()
            .find(|(_, mapped)| *mapped == c)
            .map(|(byte, _)| *byte),
    }
}

/// 把字符映射为 WinAnsiEncoding 字节，无法表示的字符用 '?'
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| win_ansi_byte(c).unwrap_or(b'?'))
        .collect()
}

/// PDF 文本字符串（文档信息字典）：ASCII 原样写入，其余用带 BOM 的 UTF-16BE
fn text_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::string_literal(text);
    }
    let mut bytes = vec![0xFE, 0xFF];
    bytes.extend(text.encode_utf16().flat_map(u16::to_be_bytes));
    Object::String(bytes, StringFormat::Literal)
}

/// 页面文本的编码方式
enum TextEncoding {
    WinAnsi,
    /// 字符到 CID 的映射，CID 从 1 开始，0 保留给缺字
    Identity(BTreeMap<char, u16>),
}

impl TextEncoding {
    fn encode(&self, text: &str) -> Object {
        match self {
            TextEncoding::WinAnsi => Object::string_literal(win_ansi(text)),
            TextEncoding::Identity(cids) => Object::String(
                text.chars()
                    .flat_map(|c| cids.get(&c).copied().unwrap_or(0).to_be_bytes())
                    .collect(),
                StringFormat::Hexadecimal,
            ),
        }
    }
}

/// CID 到 Unicode 的 ToUnicode CMap
fn to_unicode_cmap(cids: &BTreeMap<char, u16>) -> String {
    let mut cmap = String::from(
        "/CIDInit /ProcSet findresource begin\n\
         12 dict begin\n\
         begincmap\n\
         /CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
         /CMapName /Adobe-Identity-UCS def\n\
         /CMapType 2 def\n\
         1 begincodespacerange\n\
         <0000> <FFFF>\n\
         endcodespacerange\n",
    );

    // 每个 bfchar 块最多 100 项
    let entries: Vec<(&char, &u16)> = cids.iter().collect();
    for chunk in entries.chunks(100) {
        cmap.push_str(&format!("{} beginbfchar\n", chunk.len()));
        for (c, cid) in chunk {
            let mut units = [0u16; 2];
            let unicode: String = c
                .encode_utf16(&mut units)
                .iter()
                .map(|unit| format!("{:04X}", unit))
                .collect();
            cmap.push_str(&format!("<{:04X}> <{}>\n", cid, unicode));
        }
        cmap.push_str("endbfchar\n");
    }

    cmap.push_str("endcmap\nCMapName currentdict /CMap defineresource pop\nend\nend\n");
    cmap
}

fn standard_font(doc: &mut Document, base: &str) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base,
        "Encoding" => "WinAnsiEncoding",
    })
}

/// 嵌入完整字体，返回 Type0 字体对象
fn embed_font(doc: &mut Document, font: &UnicodeFont, cids: &BTreeMap<char, u16>) -> ObjectId {
    // BTreeMap 按字符排序，CID 按同一顺序递增
    let chars: Vec<char> = cids.keys().copied().collect();
    let glyphs = font.glyphs(&chars);

    let mut cid_to_gid = vec![0u8, 0u8];
    let mut widths = Vec::with_capacity(glyphs.len());
    for (glyph, width) in glyphs {
        cid_to_gid.extend(glyph.to_be_bytes());
        widths.push(Object::Integer(width));
    }

    let file_id = doc.add_object(Stream::new(
        dictionary! { "Length1" => Object::Integer(font.data().len() as i64) },
        font.data().to_vec(),
    ));
    let descriptor_id = doc.add_object(dictionary! {
        "Type" => "FontDescriptor",
        "FontName" => UNICODE_FONT_NAME,
        "Flags" => Object::Integer(32),
        "FontBBox" => font.bbox().into_iter().map(Object::Integer).collect::<Vec<_>>(),
        "ItalicAngle" => Object::Integer(0),
        "Ascent" => Object::Integer(font.ascent()),
        "Descent" => Object::Integer(font.descent()),
        "CapHeight" => Object::Integer(font.ascent()),
        "StemV" => Object::Integer(80),
        "FontFile2" => file_id,
    });
    let cid_to_gid_id = doc.add_object(Stream::new(dictionary! {}, cid_to_gid));
    let cid_font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "CIDFontType2",
        "BaseFont" => UNICODE_FONT_NAME,
        "CIDSystemInfo" => dictionary! {
            "Registry" => Object::string_literal("Adobe"),
            "Ordering" => Object::string_literal("Identity"),
            "Supplement" => Object::Integer(0),
        },
        "FontDescriptor" => descriptor_id,
        "DW" => Object::Integer(DEFAULT_GLYPH_WIDTH),
        "W" => vec![Object::Integer(1), Object::Array(widths)],
        "CIDToGIDMap" => cid_to_gid_id,
    });
    let to_unicode_id = doc.add_object(Stream::new(
        dictionary! {},
        to_unicode_cmap(cids).into_bytes(),
    ));

    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => UNICODE_FONT_NAME,
        "Encoding" => "Identity-H",
        "DescendantFonts" => vec![Object::Reference(cid_font_id)],
        "ToUnicode" => to_unicode_id,
    })
}

/// 按近似字宽折行（Helvetica 平均字宽约 0.5em）
fn wrap(text: &str, font_size: i64) -> Vec<String> {
    let max_chars = (((PAGE_WIDTH - 2 * MARGIN) * 2) / font_size).max(1) as usize;
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word = word.to_string();
        // 超长单词强制断开
        while word.chars().count() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let head: String = word.chars().take(max_chars).collect();
            word = word.chars().skip(max_chars).collect();
            lines.push(head);
        }

        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// 逐页收集绘制指令
struct PageWriter<'a> {
    encoding: &'a TextEncoding,
    pages: Vec<Vec<Operation>>,
    y: i64,
}

impl<'a> PageWriter<'a> {
    fn new(encoding: &'a TextEncoding) -> Self {
        Self {
            encoding,
            pages: Vec::new(),
            y: 0,
        }
    }

    fn new_page(&mut self) {
        self.pages.push(Vec::new());
        self.y = PAGE_HEIGHT - MARGIN;
    }

    fn ensure_room(&mut self, height: i64) {
        if self.pages.is_empty() || self.y - height < MARGIN {
            self.new_page();
        }
    }

    fn text_line(&mut self, font: &[u8], size: i64, leading: i64, text: &str) {
        self.ensure_room(leading);
        self.y -= leading;
        let y = self.y;
        let encoded = self.encoding.encode(text);
        if let Some(page) = self.pages.last_mut() {
            page.extend([
                Operation::new("BT", vec![]),
                Operation::new(
                    "Tf",
                    vec![Object::Name(font.to_vec()), Object::Integer(size)],
                ),
                Operation::new("Td", vec![Object::Integer(MARGIN), Object::Integer(y)]),
                Operation::new("Tj", vec![encoded]),
                Operation::new("ET", vec![]),
            ]);
        }
    }

    fn paragraph(&mut self, font: &[u8], size: i64, leading: i64, text: &str) {
        for line in wrap(text, size) {
            self.text_line(font, size, leading, &line);
        }
    }

    fn gap(&mut self, height: i64) {
        self.y -= height;
    }
}

/// PDF 导出
#[derive(Debug, Default, Clone)]
pub struct PdfSerializer {
    unicode_font: Option<Arc<UnicodeFont>>,
}

impl PdfSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 用于 WinAnsi 之外字符的嵌入字体
    pub fn with_unicode_font(mut self, font: Arc<UnicodeFont>) -> Self {
        self.unicode_font = Some(font);
        self
    }

    fn layout(model: &DocumentModel, encoding: &TextEncoding) -> Vec<Vec<Operation>> {
        let mut writer = PageWriter::new(encoding);

        // 标题页
        writer.new_page();
        writer.gap(PAGE_HEIGHT / 4);
        writer.paragraph(BOLD, TITLE_SIZE, TITLE_SIZE + 8, &model.title);
        writer.gap(12);
        writer.paragraph(REGULAR, SUBTITLE_SIZE, SUBTITLE_SIZE + 6, &model.subtitle);

        // 每章另起一页
        for section in &model.sections {
            writer.new_page();
            writer.paragraph(BOLD, HEADING_SIZE, HEADING_SIZE + 6, &section.heading);
            writer.gap(10);
            for paragraph in &section.paragraphs {
                writer.paragraph(REGULAR, BODY_SIZE, BODY_LEADING, paragraph);
                writer.gap(PARAGRAPH_GAP);
            }
        }

        writer.pages
    }

    fn render(&self, model: &DocumentModel) -> Result<Vec<u8>, ExportError> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        // 折行后行内只剩单个空格
        let distinct: BTreeSet<char> = model
            .blocks()
            .iter()
            .flat_map(|block| block.chars())
            .filter(|c| !c.is_whitespace())
            .chain([' '])
            .collect();
        let unsupported = distinct
            .iter()
            .filter(|c| win_ansi_byte(**c).is_none())
            .count();

        let (encoding, regular_id, bold_id) = match self.unicode_font.as_deref() {
            Some(font) if unsupported > 0 => {
                let cids: BTreeMap<char, u16> =
                    distinct.iter().copied().zip(1..=u16::MAX).collect();
                let font_id = embed_font(&mut doc, font, &cids);
                (TextEncoding::Identity(cids), font_id, font_id)
            }
            _ => {
                if unsupported > 0 {
                    tracing::warn!(
                        characters = unsupported,
                        "No Unicode font available, unsupported PDF characters rendered as '?'"
                    );
                }
                let regular_id = standard_font(&mut doc, "Helvetica");
                let bold_id = standard_font(&mut doc, "Helvetica-Bold");
                (TextEncoding::WinAnsi, regular_id, bold_id)
            }
        };
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => regular_id,
                "F2" => bold_id,
            },
        });

        let mut kids = Vec::new();
        for operations in Self::layout(model, &encoding) {
            let content = Content { operations };
            let encoded = content
                .encode()
                .map_err(|e| ExportError::Pdf(e.to_string()))?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(Object::Reference(page_id));
        }

        let count = kids.len() as i64;
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(PAGE_WIDTH),
                Object::Integer(PAGE_HEIGHT),
            ],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        let info_id = doc.add_object(dictionary! {
            "Title" => text_string(&model.title),
            "Subject" => text_string(&model.subtitle),
            "Producer" => Object::string_literal("storyloom"),
        });
        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)
            .map_err(|e| ExportError::Pdf(e.to_string()))?;
        Ok(buffer)
    }
}

impl BookSerializerPort for PdfSerializer {
    fn format(&self) -> ExportFormat {
        ExportFormat::Pdf
    }

    fn serialize(&self, book: &Book) -> Result<Vec<u8>, ExportError> {
        self.render(&DocumentModel::from_book(book))
    }
}

#[cfg(test)]
fn win_ansi_char(byte: u8) -> char {
    match byte {
        0x20..=0x7e | 0xa0..=0xff => byte as char,
        _ => WIN_ANSI_HIGH
            .iter()
            .find(|(mapped, _)| *mapped == byte)
            .map_or('?', |(_, c)| *c),
    }
}

/// 解析 ToUnicode CMap 的 bfchar 项
#[cfg(test)]
fn parse_bfchar(cmap: &[u8]) -> std::collections::HashMap<u16, String> {
    let text = String::from_utf8_lossy(cmap);
    let hex = |s: &str| s.trim().trim_matches(|c| c == '<' || c == '>').to_string();
    text.lines()
        .filter_map(|line| {
            let (code, unicode) = line.split_once(' ')?;
            if !code.starts_with('<') {
                return None;
            }
            let cid = u16::from_str_radix(&hex(code), 16).ok()?;
            let unicode = hex(unicode);
            let units: Vec<u16> = (0..unicode.len())
                .step_by(4)
                .filter_map(|i| u16::from_str_radix(unicode.get(i..i + 4)?, 16).ok())
                .collect();
            Some((cid, String::from_utf16_lossy(&units)))
        })
        .collect()
}

/// 读取 PDF 中按顺序绘制的文本行
///
/// 文档带 ToUnicode 映射时按双字节 CID 解码，否则按 WinAnsi 解码
#[cfg(test)]
pub(crate) fn extract_lines(pdf: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(pdf).unwrap();
    let to_unicode = doc
        .objects
        .values()
        .find_map(|object| match object {
            Object::Stream(stream) if stream.content.starts_with(b"/CIDInit") => {
                Some(parse_bfchar(&stream.content))
            }
            _ => None,
        })
        .unwrap_or_default();

    let mut lines = Vec::new();
    for (_number, page_id) in doc.get_pages() {
        let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
        for operation in content.operations {
            if operation.operator != "Tj" {
                continue;
            }
            if let Some(Object::String(bytes, _)) = operation.operands.first() {
                let line: String = if to_unicode.is_empty() {
                    bytes.iter().map(|b| win_ansi_char(*b)).collect()
                } else {
                    bytes
                        .chunks(2)
                        .map(|pair| {
                            let cid = u16::from_be_bytes([pair[0], *pair.get(1).unwrap_or(&0)]);
                            to_unicode.get(&cid).cloned().unwrap_or_default()
                        })
                        .collect()
                };
                lines.push(line);
            }
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::adapters::export::document::Section;
    use crate::infrastructure::adapters::export::font::minimal_ttf;

    fn model(title: &str, paragraph: &str) -> DocumentModel {
        DocumentModel {
            title: title.into(),
            subtitle: "Fiction - Fantasy (Default tone)".into(),
            sections: vec![Section {
                number: 1,
                heading: "Chapter 1: The Call".into(),
                paragraphs: vec![paragraph.into()],
            }],
        }
    }

    fn with_font() -> PdfSerializer {
        let font = UnicodeFont::from_bytes(minimal_ttf()).unwrap();
        PdfSerializer::new().with_unicode_font(Arc::new(font))
    }

    fn has_type0_font(bytes: &[u8]) -> bool {
        let doc = Document::load_mem(bytes).unwrap();
        doc.objects.values().any(|object| {
            object
                .as_dict()
                .and_then(|dict| dict.get(b"Subtype"))
                .and_then(|subtype| subtype.as_name())
                .map(|name| name == b"Type0")
                .unwrap_or(false)
        })
    }

    #[test]
    fn test_wrap_respects_width_and_keeps_words() {
        let text = "word ".repeat(100);
        let lines = wrap(&text, BODY_SIZE);
        let max_chars = (((PAGE_WIDTH - 2 * MARGIN) * 2) / BODY_SIZE) as usize;
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.chars().count() <= max_chars));
        assert_eq!(lines.join(" "), text.trim());
    }

    #[test]
    fn test_wrap_splits_overlong_words() {
        let long = "x".repeat(200);
        let lines = wrap(&long, TITLE_SIZE);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), long);
    }

    #[test]
    fn test_win_ansi_mapping() {
        assert_eq!(win_ansi("a\u{2019}b"), vec![b'a', 0x92, b'b']);
        assert_eq!(win_ansi("caf\u{e9}"), vec![b'c', b'a', b'f', 0xE9]);
        assert_eq!(
            win_ansi("5 \u{20ac} \u{153}uvre \u{160}\u{2122}\u{201a}"),
            vec![b'5', b' ', 0x80, b' ', 0x9C, b'u', b'v', b'r', b'e', b' ', 0x8A, 0x99, 0x82]
        );
        assert_eq!(win_ansi("\u{4e2d}"), vec![b'?']);
        for (byte, c) in WIN_ANSI_HIGH {
            assert_eq!(win_ansi_char(byte), c);
        }
    }

    #[test]
    fn test_render_title_page_and_chapter_pages() {
        let bytes = PdfSerializer::new()
            .render(&model("The Enchanted Forest", "It began (as always) in the woods."))
            .unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 2);

        let lines = extract_lines(&bytes);
        assert_eq!(
            lines,
            vec![
                "The Enchanted Forest",
                "Fiction - Fantasy (Default tone)",
                "Chapter 1: The Call",
                "It began (as always) in the woods.",
            ]
        );
    }

    #[test]
    fn test_win_ansi_text_keeps_standard_fonts() {
        let bytes = with_font()
            .render(&model("Caf\u{e9} \u{20ac}5", "The \u{153}uvre\u{2122}."))
            .unwrap();

        assert!(!has_type0_font(&bytes));
        assert_eq!(extract_lines(&bytes)[0], "Caf\u{e9} \u{20ac}5");
        assert_eq!(extract_lines(&bytes)[3], "The \u{153}uvre\u{2122}.");
    }

    #[test]
    fn test_non_latin_text_embeds_unicode_font() {
        let paragraph = "She smiled \u{1f600} and said \u{4f60}\u{597d}.";
        let bytes = with_font()
            .render(&model("\u{68ee}\u{6797} Forest", paragraph))
            .unwrap();

        assert!(has_type0_font(&bytes));
        assert_eq!(
            extract_lines(&bytes),
            vec![
                "\u{68ee}\u{6797} Forest",
                "Fiction - Fantasy (Default tone)",
                "Chapter 1: The Call",
                paragraph,
            ]
        );
    }

    #[test]
    fn test_without_font_unsupported_characters_degrade() {
        let bytes = PdfSerializer::new()
            .render(&model("Forest", "Said \u{4f60}\u{597d}."))
            .unwrap();

        assert!(!has_type0_font(&bytes));
        assert_eq!(extract_lines(&bytes)[3], "Said ??.");
    }

    #[test]
    fn test_to_unicode_cmap_uses_surrogate_pairs() {
        let cids: BTreeMap<char, u16> = [('A', 1), ('\u{1f600}', 2)].into_iter().collect();
        let cmap = to_unicode_cmap(&cids);
        assert!(cmap.contains("2 beginbfchar"));
        assert!(cmap.contains("<0001> <0041>"));
        assert!(cmap.contains("<0002> <D83DDE00>"));
        assert_eq!(parse_bfchar(cmap.as_bytes())[&2], "\u{1f600}");
    }
}
