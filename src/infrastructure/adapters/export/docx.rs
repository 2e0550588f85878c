//! DOCX Serializer - 最小 WordprocessingML 包

use html_escape::encode_text;

use super::archive::ArchiveBuilder;
use super::document::DocumentModel;
use crate::application::ports::{BookSerializerPort, ExportError, ExportFormat};
use crate::domain::book::Book;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
<Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>
<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>
</Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>
</Relationships>"#;

const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:pPr><w:spacing w:after="120"/></w:pPr><w:rPr><w:sz w:val="22"/></w:rPr></w:style>
<w:style w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/><w:basedOn w:val="Normal"/><w:pPr><w:spacing w:before="2400" w:after="240"/></w:pPr><w:rPr><w:b/><w:sz w:val="56"/></w:rPr></w:style>
<w:style w:type="paragraph" w:styleId="Subtitle"><w:name w:val="Subtitle"/><w:basedOn w:val="Normal"/><w:rPr><w:i/><w:sz w:val="28"/></w:rPr></w:style>
<w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/><w:pPr><w:keepNext/><w:pageBreakBefore/><w:spacing w:after="240"/><w:outlineLvl w:val="0"/></w:pPr><w:rPr><w:b/><w:sz w:val="36"/></w:rPr></w:style>
</w:styles>"#;

fn paragraph(xml: &mut String, style: Option<&str>, text: &str) {
    xml.push_str("<w:p>");
    if let Some(style) = style {
        xml.push_str(&format!(r#"<w:pPr><w:pStyle w:val="{}"/></w:pPr>"#, style));
    }
    xml.push_str(r#"<w:r><w:t xml:space="preserve">"#);
    xml.push_str(&encode_text(text));
    xml.push_str("</w:t></w:r></w:p>");
}

fn document_xml(model: &DocumentModel) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#,
    );

    paragraph(&mut xml, Some("Title"), &model.title);
    paragraph(&mut xml, Some("Subtitle"), &model.subtitle);

    for section in &model.sections {
        paragraph(&mut xml, Some("Heading1"), &section.heading);
        for text in &section.paragraphs {
            paragraph(&mut xml, None, text);
        }
    }

    xml.push_str(
        r#"<w:sectPr><w:pgSz w:w="11906" w:h="16838"/><w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440"/></w:sectPr></w:body></w:document>"#,
    );
    xml
}

fn core_xml(model: &DocumentModel) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/"><dc:title>{}</dc:title><dc:subject>{}</dc:subject><dc:creator>storyloom</dc:creator></cp:coreProperties>"#,
        encode_text(&model.title),
        encode_text(&model.subtitle)
    )
}

/// DOCX 导出
#[derive(Debug, Default, Clone, Copy)]
pub struct DocxSerializer;

impl DocxSerializer {
    pub fn new() -> Self {
        Self
    }

    fn render(model: &DocumentModel) -> Result<Vec<u8>, ExportError> {
        let mut archive = ArchiveBuilder::new();
        archive.deflated("[Content_Types].xml", CONTENT_TYPES.as_bytes())?;
        archive.deflated("_rels/.rels", ROOT_RELS.as_bytes())?;
        archive.deflated("word/_rels/document.xml.rels", DOCUMENT_RELS.as_bytes())?;
        archive.deflated("word/document.xml", document_xml(model).as_bytes())?;
        archive.deflated("word/styles.xml", STYLES.as_bytes())?;
        archive.deflated("docProps/core.xml", core_xml(model).as_bytes())?;
        archive.finish()
    }
}

impl BookSerializerPort for DocxSerializer {
    fn format(&self) -> ExportFormat {
        ExportFormat::Docx
    }

    fn serialize(&self, book: &Book) -> Result<Vec<u8>, ExportError> {
        Self::render(&DocumentModel::from_book(book))
    }
}

/// 读取 document.xml 中按顺序排列的段落文本
#[cfg(test)]
pub(crate) fn extract_paragraphs(docx: &[u8]) -> Vec<String> {
    use std::io::Read;

    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(docx)).unwrap();
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .unwrap()
        .read_to_string(&mut xml)
        .unwrap();

    let re = regex::Regex::new(r#"<w:t xml:space="preserve">(.*?)</w:t>"#).unwrap();
    re.captures_iter(&xml)
        .map(|c| html_escape::decode_html_entities(&c[1]).into_owned())
        .collect()
}
