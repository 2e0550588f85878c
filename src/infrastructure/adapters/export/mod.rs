//! Export Adapter - 书籍导出格式
//!
//! PDF 与 DOCX 都由同一个 DocumentModel 渲染，逻辑内容一致

mod archive;
mod bundle;
mod document;
mod docx;
mod epub;
mod font;
mod pdf;

use std::sync::Arc;

use crate::application::ports::BookSerializerPort;

pub use bundle::BundleSerializer;
pub use document::{split_paragraphs, DocumentModel, Section};
pub use docx::DocxSerializer;
pub use epub::EpubSerializer;
pub use font::UnicodeFont;
pub use pdf::PdfSerializer;

#[cfg(test)]
pub(crate) use docx::extract_paragraphs;
#[cfg(test)]
pub(crate) use pdf::extract_lines;

/// 全部可用的导出器
///
/// 没有 Unicode 字体时 PDF 只能表示 WinAnsi 字符
pub fn default_serializers(
    language: &str,
    unicode_font: Option<Arc<UnicodeFont>>,
) -> Vec<Arc<dyn BookSerializerPort>> {
    let mut pdf = PdfSerializer::new();
    if let Some(font) = unicode_font {
        pdf = pdf.with_unicode_font(font);
    }
    let epub = EpubSerializer::new().with_language(language);
    vec![
        Arc::new(pdf.clone()),
        Arc::new(DocxSerializer::new()),
        Arc::new(epub.clone()),
        Arc::new(BundleSerializer::new(pdf, epub)),
    ]
}
