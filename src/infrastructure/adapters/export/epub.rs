//! EPUB Serializer - EPUB 3 导出
//!
//! 封面以图片字节形式存在时会打包进 EPUB

use html_escape::{encode_double_quoted_attribute, encode_text};

use super::archive::ArchiveBuilder;
use super::document::{DocumentModel, Section};
use crate::application::ports::{BookSerializerPort, ExportError, ExportFormat};
use crate::domain::book::{Book, MediaKind};

const CONTAINER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
<rootfiles><rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/></rootfiles>
</container>"#;

fn xhtml(title: &str, body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops">
<head><title>{}</title></head>
<body>{}</body>
</html>"#,
        encode_text(title),
        body
    )
}

fn chapter_file(section: &Section) -> String {
    format!("chapter_{}.xhtml", section.number)
}

fn chapter_xhtml(section: &Section) -> String {
    let mut body = format!("<h1>{}</h1>", encode_text(&section.heading));
    for paragraph in &section.paragraphs {
        body.push_str("<p>");
        body.push_str(&encode_text(paragraph));
        body.push_str("</p>");
    }
    xhtml(&section.heading, &body)
}

fn title_xhtml(model: &DocumentModel, cover_file: Option<&str>) -> String {
    let mut body = String::new();
    if let Some(file) = cover_file {
        body.push_str(&format!(
            r#"<div><img src="{}" alt="{}"/></div>"#,
            file,
            encode_double_quoted_attribute(&model.title)
        ));
    }
    body.push_str(&format!(
        "<h1>{}</h1><h2>{}</h2>",
        encode_text(&model.title),
        encode_text(&model.subtitle)
    ));
    xhtml(&model.title, &body)
}

fn nav_xhtml(model: &DocumentModel) -> String {
    let mut items = String::new();
    for section in &model.sections {
        items.push_str(&format!(
            r#"<li><a href="{}">{}</a></li>"#,
            chapter_file(section),
            encode_text(&section.heading)
        ));
    }
    xhtml(
        &model.title,
        &format!(r#"<nav epub:type="toc" id="toc"><h1>Contents</h1><ol>{}</ol></nav>"#, items),
    )
}

/// EPUB 导出
#[derive(Debug, Clone)]
pub struct EpubSerializer {
    language: String,
}

impl Default for EpubSerializer {
    fn default() -> Self {
        Self::new()
    }
}

impl EpubSerializer {
    pub fn new() -> Self {
        Self {
            language: "en".to_string(),
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    fn package_opf(
        &self,
        book: &Book,
        model: &DocumentModel,
        cover: Option<(&str, MediaKind)>,
    ) -> String {
        let mut manifest = String::from(
            r#"<item id="nav" href="nav.xhtml" media-type="application/xhtml+xml" properties="nav"/><item id="title" href="title.xhtml" media-type="application/xhtml+xml"/>"#,
        );
        let mut spine = String::from(r#"<itemref idref="title"/>"#);

        if let Some((file, kind)) = cover {
            manifest.push_str(&format!(
                r#"<item id="cover-image" href="{}" media-type="{}" properties="cover-image"/>"#,
                file, kind.mime_type
            ));
        }
        for section in &model.sections {
            manifest.push_str(&format!(
                r#"<item id="chapter{n}" href="{file}" media-type="application/xhtml+xml"/>"#,
                n = section.number,
                file = chapter_file(section)
            ));
            spine.push_str(&format!(r#"<itemref idref="chapter{}"/>"#, section.number));
        }

        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0" unique-identifier="book-id">
<metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
<dc:identifier id="book-id">urn:uuid:{id}</dc:identifier>
<dc:title>{title}</dc:title>
<dc:description>{subtitle}</dc:description>
<dc:language>{language}</dc:language>
<meta property="dcterms:modified">{modified}</meta>
</metadata>
<manifest>{manifest}</manifest>
<spine>{spine}</spine>
</package>"#,
            id = book.id(),
            title = encode_text(&model.title),
            subtitle = encode_text(&model.subtitle),
            language = encode_text(&self.language),
            modified = book.created_at().format("%Y-%m-%dT%H:%M:%SZ"),
            manifest = manifest,
            spine = spine,
        )
    }
}

impl BookSerializerPort for EpubSerializer {
    fn format(&self) -> ExportFormat {
        ExportFormat::Epub
    }

    fn serialize(&self, book: &Book) -> Result<Vec<u8>, ExportError> {
        let model = DocumentModel::from_book(book);
        let cover = book
            .cover()
            .and_then(|c| c.image().bytes())
            .map(|bytes| (bytes, MediaKind::sniff_image(bytes)));
        let cover_file = cover.map(|(_, kind)| format!("cover.{}", kind.extension));

        let mut archive = ArchiveBuilder::new();
        // mimetype 必须是第一个且不压缩
        archive.stored("mimetype", b"application/epub+zip")?;
        archive.deflated("META-INF/container.xml", CONTAINER.as_bytes())?;
        archive.deflated(
            "OEBPS/content.opf",
            self.package_opf(
                book,
                &model,
                cover_file.as_deref().zip(cover.map(|(_, kind)| kind)),
            )
            .as_bytes(),
        )?;
        archive.deflated("OEBPS/nav.xhtml", nav_xhtml(&model).as_bytes())?;
        archive.deflated(
            "OEBPS/title.xhtml",
            title_xhtml(&model, cover_file.as_deref()).as_bytes(),
        )?;
        if let (Some((bytes, _)), Some(file)) = (cover, cover_file.as_deref()) {
            archive.deflated(&format!("OEBPS/{}", file), bytes)?;
        }
        for section in &model.sections {
            archive.deflated(
                &format!("OEBPS/{}", chapter_file(section)),
                chapter_xhtml(section).as_bytes(),
            )?;
        }
        archive.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};

    use crate::domain::book::{BookConfig, BookType, Chapter, CoverImage, ImageRef, Tone};
    use crate::domain::Outline;

    fn book(cover: Option<CoverImage>) -> Book {
        let config =
            BookConfig::new(BookType::Fiction, "Romance", Tone::Romantic, 3, None, None).unwrap();
        let outline = Outline::from_titles(vec!["A".into(), "B".into(), "C".into()]);
        let chapters = (0..3)
            .map(|i| Chapter::new(i, ["A", "B", "C"][i], "Once <upon> a time."))
            .collect();
        Book::assemble(config, outline, chapters, cover, Vec::new(), Vec::new()).unwrap()
    }

    fn read(archive: &mut zip::ZipArchive<Cursor<&[u8]>>, name: &str) -> String {
        let mut out = String::new();
        archive.by_name(name).unwrap().read_to_string(&mut out).unwrap();
        out
    }

    #[test]
    fn test_epub_structure_without_cover() {
        let bytes = EpubSerializer::new().serialize(&book(None)).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();

        let first = archive.by_index(0).unwrap();
        assert_eq!(first.name(), "mimetype");
        assert_eq!(first.compression(), zip::CompressionMethod::Stored);
        drop(first);

        let opf = read(&mut archive, "OEBPS/content.opf");
        assert!(opf.contains("<dc:title>Untitled</dc:title>"));
        assert!(opf.contains(r#"<itemref idref="chapter3"/>"#));
        assert!(!opf.contains("cover-image"));

        let chapter = read(&mut archive, "OEBPS/chapter_2.xhtml");
        assert!(chapter.contains("<h1>Chapter 2: B</h1>"));
        assert!(chapter.contains("<p>Once &lt;upon&gt; a time.</p>"));
    }

    #[test]
    fn test_epub_embeds_cover_bytes() {
        let cover = CoverImage::new(ImageRef::Bytes(vec![0xFF, 0xD8, 0xFF, 0xE0]), "p");
        let bytes = EpubSerializer::new().serialize(&book(Some(cover))).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();

        assert!(archive.by_name("OEBPS/cover.jpg").is_ok());
        let opf = read(&mut archive, "OEBPS/content.opf");
        let cover_item = r#"href="cover.jpg" media-type="image/jpeg" properties="cover-image""#;
        assert!(opf.contains(cover_item));
    }
}
