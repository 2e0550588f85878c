//! Media Kind - 按文件头识别音频与图片格式

/// 媒体类型（扩展名 + MIME）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaKind {
    pub extension: &'static str,
    pub mime_type: &'static str,
}

const MP3: MediaKind = MediaKind { extension: "mp3", mime_type: "audio/mpeg" };
const WAV: MediaKind = MediaKind { extension: "wav", mime_type: "audio/wav" };
const OGG: MediaKind = MediaKind { extension: "ogg", mime_type: "audio/ogg" };
const PNG: MediaKind = MediaKind { extension: "png", mime_type: "image/png" };
const JPEG: MediaKind = MediaKind { extension: "jpg", mime_type: "image/jpeg" };
const WEBP: MediaKind = MediaKind { extension: "webp", mime_type: "image/webp" };
const BIN: MediaKind = MediaKind { extension: "bin", mime_type: "application/octet-stream" };

impl MediaKind {
    /// 识别音频格式，无法识别时按 mp3 处理
    pub fn sniff_audio(bytes: &[u8]) -> MediaKind {
        if bytes.starts_with(b"RIFF") && bytes.get(8..12) == Some(b"WAVE".as_slice()) {
            WAV
        } else if bytes.starts_with(b"OggS") {
            OGG
        } else {
            MP3
        }
    }

    /// 识别图片格式
    pub fn sniff_image(bytes: &[u8]) -> MediaKind {
        if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
            PNG
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            JPEG
        } else if bytes.starts_with(b"RIFF") && bytes.get(8..12) == Some(b"WEBP".as_slice()) {
            WEBP
        } else {
            BIN
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_audio() {
        assert_eq!(MediaKind::sniff_audio(b"RIFF\0\0\0\0WAVEfmt ").extension, "wav");
        assert_eq!(MediaKind::sniff_audio(b"OggS....").extension, "ogg");
        assert_eq!(MediaKind::sniff_audio(b"ID3\x04").mime_type, "audio/mpeg");
    }

    #[test]
    fn test_sniff_image() {
        assert_eq!(MediaKind::sniff_image(&[0x89, b'P', b'N', b'G', 13, 10]).extension, "png");
        assert_eq!(MediaKind::sniff_image(&[0xFF, 0xD8, 0xFF, 0xE0]).mime_type, "image/jpeg");
        assert_eq!(MediaKind::sniff_image(b"RIFF\0\0\0\0WEBPVP8 ").extension, "webp");
        assert_eq!(MediaKind::sniff_image(b"????").extension, "bin");
    }
}
