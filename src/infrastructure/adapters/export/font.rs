//! Unicode Font - PDF 嵌入用的 TrueType 字体
//!
//! 内置 Helvetica 只覆盖 WinAnsiEncoding，其余字符（CJK、emoji 等）需要嵌入字体

use std::fmt;
use std::path::{Path, PathBuf};

use ttf_parser::Face;

use crate::application::ports::ExportError;

/// 未配置字体时依次尝试的系统字体
const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial Unicode.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// 缺少字宽信息时使用的宽度（1000 单位）
pub(super) const DEFAULT_GLYPH_WIDTH: i64 = 500;

/// 已校验的 TrueType 字体
pub struct UnicodeFont {
    data: Vec<u8>,
    units_per_em: u16,
    ascent: i16,
    descent: i16,
    bbox: [i16; 4],
}

impl fmt::Debug for UnicodeFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnicodeFont")
            .field("size", &self.data.len())
            .field("units_per_em", &self.units_per_em)
            .finish()
    }
}

impl UnicodeFont {
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, ExportError> {
        let face = Face::parse(&data, 0).map_err(|e| ExportError::Font(e.to_string()))?;
        let rect = face.global_bounding_box();
        let units_per_em = face.units_per_em();
        let ascent = face.ascender();
        let descent = face.descender();

        Ok(Self {
            bbox: [rect.x_min, rect.y_min, rect.x_max, rect.y_max],
            units_per_em,
            ascent,
            descent,
            data,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ExportError> {
        let data = std::fs::read(path.as_ref())?;
        Self::from_bytes(data)
    }

    /// 在常见系统路径中寻找第一个可用字体
    pub fn discover() -> Option<(PathBuf, Self)> {
        SYSTEM_FONT_CANDIDATES
            .iter()
            .map(PathBuf::from)
            .filter(|path| path.is_file())
            .find_map(|path| match Self::load(&path) {
                Ok(font) => Some((path, font)),
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "Skipping unusable font");
                    None
                }
            })
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// 字体单位换算为 PDF 的 1000 单位
    fn scale(&self, value: i64) -> i64 {
        value * 1000 / i64::from(self.units_per_em.max(1))
    }

    pub(super) fn ascent(&self) -> i64 {
        self.scale(i64::from(self.ascent))
    }

    pub(super) fn descent(&self) -> i64 {
        self.scale(i64::from(self.descent))
    }

    pub(super) fn bbox(&self) -> [i64; 4] {
        self.bbox.map(|v| self.scale(i64::from(v)))
    }

    /// 每个字符的 (字形编号, 字宽)，字体缺字时字形为 0
    pub(super) fn glyphs(&self, chars: &[char]) -> Vec<(u16, i64)> {
        let Ok(face) = Face::parse(&self.data, 0) else {
            return chars.iter().map(|_| (0, DEFAULT_GLYPH_WIDTH)).collect();
        };

        chars
            .iter()
            .map(|c| match face.glyph_index(*c) {
                Some(glyph) => {
                    let width = face
                        .glyph_hor_advance(glyph)
                        .map(|advance| self.scale(i64::from(advance)))
                        .unwrap_or(DEFAULT_GLYPH_WIDTH);
                    (glyph.0, width)
                }
                None => (0, DEFAULT_GLYPH_WIDTH),
            })
            .collect()
    }
}

/// 只含 head / hhea / maxp 的最小 TrueType 文件
#[cfg(test)]
pub(super) fn minimal_ttf() -> Vec<u8> {
    fn be16(out: &mut Vec<u8>, value: u16) {
        out.extend(value.to_be_bytes());
    }
    fn be32(out: &mut Vec<u8>, value: u32) {
        out.extend(value.to_be_bytes());
    }

    let mut head = Vec::new();
    be32(&mut head, 0x0001_0000); // version
    be32(&mut head, 0x0001_0000); // fontRevision
    be32(&mut head, 0); // checkSumAdjustment
    be32(&mut head, 0x5F0F_3CF5); // magicNumber
    be16(&mut head, 0); // flags
    be16(&mut head, 1000); // unitsPerEm
    head.extend([0u8; 16]); // created + modified
    for v in [-100i16, -200, 900, 800] {
        be16(&mut head, v as u16);
    }
    be16(&mut head, 0); // macStyle
    be16(&mut head, 8); // lowestRecPPEM
    be16(&mut head, 2); // fontDirectionHint
    be16(&mut head, 0); // indexToLocFormat
    be16(&mut head, 0); // glyphDataFormat
    assert_eq!(head.len(), 54);

    let mut hhea = Vec::new();
    be32(&mut hhea, 0x0001_0000);
    be16(&mut hhea, 800); // ascender
    be16(&mut hhea, (-200i16) as u16); // descender
    hhea.extend([0u8; 26]);
    be16(&mut hhea, 0); // numberOfHMetrics
    assert_eq!(hhea.len(), 36);

    let mut maxp = Vec::new();
    be32(&mut maxp, 0x0000_5000);
    be16(&mut maxp, 1);

    let tables: [(&[u8; 4], Vec<u8>); 3] = [(b"head", head), (b"hhea", hhea), (b"maxp", maxp)];
    let mut font = Vec::new();
    be32(&mut font, 0x0001_0000);
    be16(&mut font, tables.len() as u16);
    be16(&mut font, 32); // searchRange
    be16(&mut font, 1); // entrySelector
    be16(&mut font, 16); // rangeShift

    let mut offset = 12 + 16 * tables.len();
    let mut body = Vec::new();
    for (tag, data) in &tables {
        font.extend(*tag);
        be32(&mut font, 0);
        be32(&mut font, offset as u32);
        be32(&mut font, data.len() as u32);
        body.extend(data);
        while body.len() % 4 != 0 {
            body.push(0);
        }
        offset = 12 + 16 * tables.len() + body.len();
    }
    font.extend(body);
    font
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_metrics_scaled_to_pdf_units() {
        let font = UnicodeFont::from_bytes(minimal_ttf()).unwrap();
        assert_eq!(font.ascent(), 800);
        assert_eq!(font.descent(), -200);
        assert_eq!(font.bbox(), [-100, -200, 900, 800]);
    }

    #[test]
    fn test_missing_glyphs_fall_back_to_notdef() {
        let font = UnicodeFont::from_bytes(minimal_ttf()).unwrap();
        assert_eq!(
            font.glyphs(&['a', '\u{4f60}']),
            vec![(0, DEFAULT_GLYPH_WIDTH), (0, DEFAULT_GLYPH_WIDTH)]
        );
    }

    #[test]
    fn test_rejects_non_font_data() {
        let err = UnicodeFont::from_bytes(b"not a font".to_vec()).unwrap_err();
        assert!(matches!(err, ExportError::Font(_)));
        assert!(UnicodeFont::load("/nonexistent/font.ttf").is_err());
    }
}
