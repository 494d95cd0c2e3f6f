use std::sync::Arc;

use crate::io::ReadAt;
use anyhow::{Result, bail};

use super::crc::crc32;
use super::parser::ZipParser;
use super::structures::{CompressionMethod, ZipFileEntry};

/// An entry whose stored content does not match its recorded checksum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrcMismatch {
    pub file_name: String,
    pub expected: u32,
    pub actual: u32,
}

/// High-level reader for stored ZIP archives.
pub struct ZipExtractor<R: ReadAt> {
    parser: ZipParser<R>,
}

impl<R: ReadAt> ZipExtractor<R> {
    pub fn new(reader: Arc<R>) -> Self {
        Self {
            parser: ZipParser::new(reader),
        }
    }

    /// List all files in the archive
    pub async fn list_files(&self) -> Result<Vec<ZipFileEntry>> {
        self.parser.list_files().await
    }

    /// Extract file data to memory
    pub async fn extract_to_memory(&self, entry: &ZipFileEntry) -> Result<Vec<u8>> {
        if entry.compression_method != CompressionMethod::Stored {
            bail!(
                "Unsupported compression method: {} (only STORED/uncompressed is supported)",
                entry.compression_method.as_u16()
            );
        }
        if entry.compressed_size != entry.uncompressed_size {
            bail!(
                "{}: stored entry has compressed size {} but uncompressed size {}",
                entry.file_name,
                entry.compressed_size,
                entry.uncompressed_size
            );
        }

        let data_offset = self.parser.get_data_offset(entry).await?;
        let archive_size = self.parser.reader().size();
        match data_offset.checked_add(entry.uncompressed_size) {
            Some(end) if end <= archive_size => {}
            _ => bail!(
                "{}: {} bytes at offset {} run past the end of the archive ({} bytes)",
                entry.file_name,
                entry.uncompressed_size,
                data_offset,
                archive_size
            ),
        }

        let mut buf = vec![0u8; entry.uncompressed_size as usize];
        self.parser.reader().read_at(data_offset, &mut buf).await?;

        Ok(buf)
    }

    /// Re-read every entry and compare its CRC-32 with the central directory.
    ///
    /// Returns the mismatching entries; an empty list means the archive is intact.
    pub async fn verify(&self) -> Result<Vec<CrcMismatch>> {
        let mut mismatches = Vec::new();
        for entry in self.list_files().await? {
            let data = self.extract_to_memory(&entry).await?;
            let actual = crc32(&data);
            if actual != entry.crc32 {
                mismatches.push(CrcMismatch {
                    file_name: entry.file_name,
                    expected: entry.crc32,
                    actual,
                });
            }
        }
        Ok(mismatches)
    }
}
