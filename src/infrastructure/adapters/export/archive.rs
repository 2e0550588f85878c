//! 内存中的 zip 写入器

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::application::ports::ExportError;

pub(super) struct ArchiveBuilder {
    zip: ZipWriter<Cursor<Vec<u8>>>,
}

impl ArchiveBuilder {
    pub(super) fn new() -> Self {
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    fn add(
        &mut self,
        name: &str,
        data: &[u8],
        method: CompressionMethod,
    ) -> Result<(), ExportError> {
        // 固定时间戳，相同的书总是得到相同的字节
        let options = SimpleFileOptions::default()
            .compression_method(method)
            .last_modified_time(DateTime::default());
        self.zip
            .start_file(name, options)
            .map_err(|e| ExportError::Archive(e.to_string()))?;
        self.zip.write_all(data)?;
        Ok(())
    }

    /// 压缩写入
    pub(super) fn deflated(&mut self, name: &str, data: &[u8]) -> Result<(), ExportError> {
        self.add(name, data, CompressionMethod::Deflated)
    }

    /// 不压缩写入（EPUB 的 mimetype 必须如此）
    pub(super) fn stored(&mut self, name: &str, data: &[u8]) -> Result<(), ExportError> {
        self.add(name, data, CompressionMethod::Stored)
    }

    pub(super) fn finish(self) -> Result<Vec<u8>, ExportError> {
        let cursor = self
            .zip
            .finish()
            .map_err(|e| ExportError::Archive(e.to_string()))?;
        Ok(cursor.into_inner())
    }
}
