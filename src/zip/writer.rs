//! In-memory builder for stored (uncompressed) ZIP archives.
//!
//! Entries are appended with [`ZipWriter::add_file`]. Each call checksums the
//! data, stamps it with the current local time and reserves the entry's
//! position in the output. [`ZipWriter::build`] then lays out the whole
//! archive in one buffer:
//!
//! ```text
//! [LFH 0][data 0] ... [LFH n][data n] [CDFH 0] ... [CDFH n] [EOCD]
//! ```
//!
//! The builder has a single owner; callers that produce entries concurrently
//! must funnel them through one task (see [`crate::batch`]).

use std::io::Write;

use thiserror::Error;

use super::crc::crc32;
use super::dostime::DosDateTime;
use super::structures::{CentralDirectoryHeader, EndOfCentralDirectory, LocalFileHeader};

/// Inputs that cannot be expressed in a ZIP archive without ZIP64 extensions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ZipWriteError {
    #[error("file name is {0} bytes, the format allows at most 65535")]
    NameTooLong(usize),
    #[error("file data is {0} bytes, the format allows at most 4294967295")]
    DataTooLarge(usize),
    #[error("archive would exceed 4294967295 bytes")]
    ArchiveTooLarge,
    #[error("archive already holds 65535 entries")]
    TooManyEntries,
}

/// One stored file, owned by the [`ZipWriter`] that created it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    name: String,
    data: Vec<u8>,
    crc32: u32,
    size: u32,
    modified: DosDateTime,
    local_offset: u32,
}

impl ArchiveEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw name bytes as written to the headers (UTF-8, no language-encoding flag).
    pub fn name_bytes(&self) -> &[u8] {
        self.name.as_bytes()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn crc32(&self) -> u32 {
        self.crc32
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn modified(&self) -> DosDateTime {
        self.modified
    }

    /// Offset of this entry's local file header within the built archive.
    pub fn local_offset(&self) -> u32 {
        self.local_offset
    }

    fn local_header(&self) -> LocalFileHeader<'_> {
        LocalFileHeader {
            modified: self.modified,
            crc32: self.crc32,
            size: self.size,
            file_name: self.name_bytes(),
        }
    }

    fn central_header(&self) -> CentralDirectoryHeader<'_> {
        CentralDirectoryHeader {
            modified: self.modified,
            crc32: self.crc32,
            size: self.size,
            lfh_offset: self.local_offset,
            file_name: self.name_bytes(),
        }
    }
}

/// Accumulates entries and serializes them as a stored ZIP archive.
///
/// ## Example
///
/// ```
/// use cropzip::ZipWriter;
///
/// let mut zip = ZipWriter::new();
/// zip.add_file("a.txt", b"hi".to_vec()).unwrap();
/// zip.add_file("b.bin", vec![1, 2, 3]).unwrap();
///
/// let bytes = zip.build();
/// assert_eq!(bytes.len(), (30 + 5 + 2) + (30 + 5 + 3) + (46 + 5) * 2 + 22);
/// ```
#[derive(Debug, Default, Clone)]
pub struct ZipWriter {
    entries: Vec<ArchiveEntry>,
    /// Bytes of local headers and file data committed so far.
    cursor: u64,
    /// Bytes the central directory will occupy.
    central_len: u64,
}

/// Position of an entry that passed the format limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Slot {
    local_offset: u32,
    cursor: u64,
    central_len: u64,
}

impl ZipWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a file stamped with the current local time.
    ///
    /// Names are not validated and duplicates are kept as separate entries.
    pub fn add_file(
        &mut self,
        name: impl Into<String>,
        data: impl Into<Vec<u8>>,
    ) -> Result<(), ZipWriteError> {
        self.add_file_at(name, data, DosDateTime::now())
    }

    /// Append a file with an explicit modification time.
    ///
    /// On error the builder is left unchanged.
    pub fn add_file_at(
        &mut self,
        name: impl Into<String>,
        data: impl Into<Vec<u8>>,
        modified: DosDateTime,
    ) -> Result<(), ZipWriteError> {
        let name = name.into();
        let data = data.into();

        let size = u32::try_from(data.len()).map_err(|_| ZipWriteError::DataTooLarge(data.len()))?;
        let slot = self.reserve(name.len(), size)?;

        self.entries.push(ArchiveEntry {
            crc32: crc32(&data),
            size,
            modified,
            local_offset: slot.local_offset,
            name,
            data,
        });
        self.cursor = slot.cursor;
        self.central_len = slot.central_len;
        Ok(())
    }

    /// Work out where an entry would go without committing it.
    fn reserve(&self, name_len: usize, size: u32) -> Result<Slot, ZipWriteError> {
        if name_len > u16::MAX as usize {
            return Err(ZipWriteError::NameTooLong(name_len));
        }
        if self.entries.len() >= u16::MAX as usize {
            return Err(ZipWriteError::TooManyEntries);
        }

        let local_offset = u32::try_from(self.cursor).map_err(|_| ZipWriteError::ArchiveTooLarge)?;
        let cursor = self.cursor + (LocalFileHeader::SIZE + name_len) as u64 + size as u64;
        let central_len = self.central_len + (CentralDirectoryHeader::SIZE + name_len) as u64;
        // Offsets and sizes in the EOCD are 32-bit
        if cursor > u32::MAX as u64 || central_len > u32::MAX as u64 {
            return Err(ZipWriteError::ArchiveTooLarge);
        }

        Ok(Slot {
            local_offset,
            cursor,
            central_len,
        })
    }

    /// Number of entries added so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> impl ExactSizeIterator<Item = &ArchiveEntry> {
        self.entries.iter()
    }

    /// Length of the local data region, which is also where the central directory starts.
    pub fn local_data_len(&self) -> u64 {
        self.cursor
    }

    /// Length of the archive [`build`](Self::build) would return.
    pub fn archive_len(&self) -> usize {
        (self.cursor + self.central_len) as usize + EndOfCentralDirectory::SIZE
    }

    /// Serialize the archive into `out`.
    pub fn write_to<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        for entry in &self.entries {
            entry.local_header().write_to(out)?;
            out.write_all(&entry.data)?;
        }

        for entry in &self.entries {
            entry.central_header().write_to(out)?;
        }

        // Bounds were enforced on insertion
        EndOfCentralDirectory::new(
            self.entries.len() as u16,
            self.central_len as u32,
            self.cursor as u32,
        )
        .write_to(out)
    }

    /// Serialize the archive into a fresh buffer.
    ///
    /// Does not modify the builder; repeated calls return identical bytes.
    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.archive_len());
        self.write_to(&mut out)
            .expect("writing into a Vec<u8> cannot fail");
        out
    }
}
