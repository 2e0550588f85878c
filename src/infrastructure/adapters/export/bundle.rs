//! Bundle Serializer - 打包全部导出内容
//!
//! book.pdf / book.docx / book.epub / outline.txt / characters.json
//! / chapter_{n}.{ext} 朗读音频 / cover.{ext}
//! / illustration_{n}.{ext} 章节插图 / portrait_{n}.{ext} 角色肖像
//!
//! 只打包已下载的图片，外部 URL 不写入

use super::archive::ArchiveBuilder;
use super::{DocxSerializer, EpubSerializer, PdfSerializer};
use crate::application::ports::{BookSerializerPort, ExportError, ExportFormat};
use crate::domain::book::{Book, ImageRef, MediaKind};

/// ZIP 打包导出
#[derive(Debug, Default, Clone)]
pub struct BundleSerializer {
    pdf: PdfSerializer,
    docx: DocxSerializer,
    epub: EpubSerializer,
}

impl BundleSerializer {
    pub fn new(pdf: PdfSerializer, epub: EpubSerializer) -> Self {
        Self {
            pdf,
            docx: DocxSerializer::new(),
            epub,
        }
    }
}

fn add_image(archive: &mut ArchiveBuilder, stem: &str, bytes: &[u8]) -> Result<(), ExportError> {
    let kind = MediaKind::sniff_image(bytes);
    archive.deflated(&format!("{}.{}", stem, kind.extension), bytes)
}

impl BookSerializerPort for BundleSerializer {
    fn format(&self) -> ExportFormat {
        ExportFormat::Zip
    }

    fn serialize(&self, book: &Book) -> Result<Vec<u8>, ExportError> {
        let mut archive = ArchiveBuilder::new();

        archive.deflated("book.pdf", &self.pdf.serialize(book)?)?;
        archive.deflated("book.docx", &self.docx.serialize(book)?)?;
        archive.deflated("book.epub", &self.epub.serialize(book)?)?;
        archive.deflated("outline.txt", book.outline().to_numbered_text().as_bytes())?;

        let characters = serde_json::to_vec_pretty(book.characters())
            .map_err(|e| ExportError::Archive(e.to_string()))?;
        archive.deflated("characters.json", &characters)?;

        for chapter in book.chapters() {
            if let Some(audio) = chapter.audio() {
                let kind = MediaKind::sniff_audio(audio);
                archive.deflated(
                    &format!("chapter_{}.{}", chapter.number(), kind.extension),
                    audio,
                )?;
            }
        }

        if let Some(bytes) = book.cover().and_then(|c| c.image().bytes()) {
            add_image(&mut archive, "cover", bytes)?;
        }

        for chapter in book.chapters() {
            if let Some(bytes) = chapter.illustration().and_then(ImageRef::bytes) {
                add_image(&mut archive, &format!("illustration_{}", chapter.number()), bytes)?;
            }
        }

        for index in 0..book.characters().len() {
            if let Some(bytes) = book.portrait(index).and_then(ImageRef::bytes) {
                add_image(&mut archive, &format!("portrait_{}", index + 1), bytes)?;
            }
        }

        archive.finish()
    }
}
