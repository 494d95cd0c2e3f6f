use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Cursor, Read, Write};

use anyhow::{Result, bail};

use super::dostime::DosDateTime;

/// "Version needed to extract" / "version made by" written for every entry (2.0).
pub const ZIP_VERSION: u16 = 20;

/// ZIP compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Stored,
    Deflate,
    Unknown(u16),
}

impl CompressionMethod {
    pub fn from_u16(value: u16) -> Self {
        match value {
            0 => CompressionMethod::Stored,
            8 => CompressionMethod::Deflate,
            _ => CompressionMethod::Unknown(value),
        }
    }

    pub fn as_u16(&self) -> u16 {
        match self {
            CompressionMethod::Stored => 0,
            CompressionMethod::Deflate => 8,
            CompressionMethod::Unknown(v) => *v,
        }
    }
}

/// Local File Header (LFH) - 30 bytes + file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFileHeader<'a> {
    pub modified: DosDateTime,
    pub crc32: u32,
    pub size: u32,
    pub file_name: &'a [u8],
}

impl LocalFileHeader<'_> {
    pub const SIGNATURE: &'static [u8] = b"PK\x03\x04";
    pub const SIZE: usize = 30;

    /// Encoded length including the file name.
    pub fn encoded_len(&self) -> usize {
        Self::SIZE + self.file_name.len()
    }

    /// Serialize as a stored entry: no flags, no extra field, sizes equal.
    pub fn write_to<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        out.write_all(Self::SIGNATURE)?;
        out.write_u16::<LittleEndian>(ZIP_VERSION)?;
        out.write_u16::<LittleEndian>(0)?; // flags
        out.write_u16::<LittleEndian>(CompressionMethod::Stored.as_u16())?;
        out.write_u16::<LittleEndian>(self.modified.time)?;
        out.write_u16::<LittleEndian>(self.modified.date)?;
        out.write_u32::<LittleEndian>(self.crc32)?;
        out.write_u32::<LittleEndian>(self.size)?; // compressed
        out.write_u32::<LittleEndian>(self.size)?; // uncompressed
        out.write_u16::<LittleEndian>(self.file_name.len() as u16)?;
        out.write_u16::<LittleEndian>(0)?; // extra field length
        out.write_all(self.file_name)
    }

    /// Read the (file name length, extra field length) pair from a raw LFH.
    pub fn variable_lengths(data: &[u8]) -> Result<(u16, u16)> {
        if data.len() < Self::SIZE || &data[0..4] != Self::SIGNATURE {
            bail!("Invalid Local File Header");
        }
        let mut cursor = Cursor::new(&data[26..Self::SIZE]);
        let file_name_length = cursor.read_u16::<LittleEndian>()?;
        let extra_field_length = cursor.read_u16::<LittleEndian>()?;
        Ok((file_name_length, extra_field_length))
    }
}

/// Central Directory File Header (CDFH) - 46 bytes + file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CentralDirectoryHeader<'a> {
    pub modified: DosDateTime,
    pub crc32: u32,
    pub size: u32,
    pub lfh_offset: u32,
    pub file_name: &'a [u8],
}

impl CentralDirectoryHeader<'_> {
    pub const SIGNATURE: &'static [u8] = b"PK\x01\x02";
    pub const SIZE: usize = 46;

    /// Encoded length including the file name.
    pub fn encoded_len(&self) -> usize {
        Self::SIZE + self.file_name.len()
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        out.write_all(Self::SIGNATURE)?;
        out.write_u16::<LittleEndian>(ZIP_VERSION)?; // made by
        out.write_u16::<LittleEndian>(ZIP_VERSION)?; // needed
        out.write_u16::<LittleEndian>(0)?; // flags
        out.write_u16::<LittleEndian>(CompressionMethod::Stored.as_u16())?;
        out.write_u16::<LittleEndian>(self.modified.time)?;
        out.write_u16::<LittleEndian>(self.modified.date)?;
        out.write_u32::<LittleEndian>(self.crc32)?;
        out.write_u32::<LittleEndian>(self.size)?;
        out.write_u32::<LittleEndian>(self.size)?;
        out.write_u16::<LittleEndian>(self.file_name.len() as u16)?;
        out.write_u16::<LittleEndian>(0)?; // extra field length
        out.write_u16::<LittleEndian>(0)?; // comment length
        out.write_u16::<LittleEndian>(0)?; // disk number start
        out.write_u16::<LittleEndian>(0)?; // internal attributes
        out.write_u32::<LittleEndian>(0)?; // external attributes
        out.write_u32::<LittleEndian>(self.lfh_offset)?;
        out.write_all(self.file_name)
    }
}

/// End of Central Directory (EOCD) - 22 bytes minimum
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndOfCentralDirectory {
    pub disk_number: u16,
    pub disk_with_cd: u16,
    pub disk_entries: u16,
    pub total_entries: u16,
    pub cd_size: u32,
    pub cd_offset: u32,
    pub comment_len: u16,
}

impl EndOfCentralDirectory {
    pub const SIGNATURE: &'static [u8] = b"PK\x05\x06";
    pub const SIZE: usize = 22;

    /// Single-disk record without a comment.
    pub fn new(entries: u16, cd_size: u32, cd_offset: u32) -> Self {
        Self {
            disk_number: 0,
            disk_with_cd: 0,
            disk_entries: entries,
            total_entries: entries,
            cd_size,
            cd_offset,
            comment_len: 0,
        }
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE {
            bail!("Invalid End of Central Directory");
        }

        // Verify signature
        if &data[0..4] != Self::SIGNATURE {
            bail!("Invalid End of Central Directory");
        }

        let mut cursor = Cursor::new(&data[4..]);

        Ok(Self {
            disk_number: cursor.read_u16::<LittleEndian>()?,
            disk_with_cd: cursor.read_u16::<LittleEndian>()?,
            disk_entries: cursor.read_u16::<LittleEndian>()?,
            total_entries: cursor.read_u16::<LittleEndian>()?,
            cd_size: cursor.read_u32::<LittleEndian>()?,
            cd_offset: cursor.read_u32::<LittleEndian>()?,
            comment_len: cursor.read_u16::<LittleEndian>()?,
        })
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        out.write_all(Self::SIGNATURE)?;
        out.write_u16::<LittleEndian>(self.disk_number)?;
        out.write_u16::<LittleEndian>(self.disk_with_cd)?;
        out.write_u16::<LittleEndian>(self.disk_entries)?;
        out.write_u16::<LittleEndian>(self.total_entries)?;
        out.write_u32::<LittleEndian>(self.cd_size)?;
        out.write_u32::<LittleEndian>(self.cd_offset)?;
        out.write_u16::<LittleEndian>(self.comment_len)
    }

    /// Multi-volume archives are not supported by this reader.
    pub fn is_multi_disk(&self) -> bool {
        self.disk_number != 0 || self.disk_with_cd != 0 || self.disk_entries != self.total_entries
    }
}

/// Parsed ZIP file entry information
#[derive(Debug, Clone)]
pub struct ZipFileEntry {
    pub file_name: String,
    pub file_name_raw: Vec<u8>,
    pub compression_method: CompressionMethod,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
    pub crc32: u32,
    pub lfh_offset: u64,
    pub modified: DosDateTime,
    pub is_directory: bool,
}

impl ZipFileEntry {
    /// Parse one central directory header from a cursor positioned at its signature.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut sig = [0u8; 4];
        reader.read_exact(&mut sig)?;
        if sig != CentralDirectoryHeader::SIGNATURE {
            bail!("Invalid Central Directory File Header");
        }

        let _version_made_by = reader.read_u16::<LittleEndian>()?;
        let _version_needed = reader.read_u16::<LittleEndian>()?;
        let _flags = reader.read_u16::<LittleEndian>()?;
        let compression_method = reader.read_u16::<LittleEndian>()?;
        let time = reader.read_u16::<LittleEndian>()?;
        let date = reader.read_u16::<LittleEndian>()?;
        let crc32 = reader.read_u32::<LittleEndian>()?;
        let compressed_size = reader.read_u32::<LittleEndian>()? as u64;
        let uncompressed_size = reader.read_u32::<LittleEndian>()? as u64;
        let file_name_length = reader.read_u16::<LittleEndian>()?;
        let extra_field_length = reader.read_u16::<LittleEndian>()?;
        let file_comment_length = reader.read_u16::<LittleEndian>()?;
        let _disk_number_start = reader.read_u16::<LittleEndian>()?;
        let _internal_attrs = reader.read_u16::<LittleEndian>()?;
        let _external_attrs = reader.read_u32::<LittleEndian>()?;
        let lfh_offset = reader.read_u32::<LittleEndian>()? as u64;

        let mut file_name_raw = vec![0u8; file_name_length as usize];
        reader.read_exact(&mut file_name_raw)?;
        // Names carry no UTF-8 flag; decode lossily
        let file_name = String::from_utf8_lossy(&file_name_raw).to_string();
        let is_directory = file_name.ends_with('/');

        // Extra field and comment are not used
        let skip = extra_field_length as u64 + file_comment_length as u64;
        std::io::copy(&mut reader.by_ref().take(skip), &mut std::io::sink())?;

        Ok(ZipFileEntry {
            file_name,
            file_name_raw,
            compression_method: CompressionMethod::from_u16(compression_method),
            compressed_size,
            uncompressed_size,
            crc32,
            lfh_offset,
            modified: DosDateTime { time, date },
            is_directory,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stamp() -> DosDateTime {
        DosDateTime {
            time: 0x5377,
            date: 0x5861,
        }
    }

    #[test]
    fn local_header_layout() {
        let header = LocalFileHeader {
            modified: stamp(),
            crc32: 0xDEAD_BEEF,
            size: 3,
            file_name: b"a.txt",
        };
        let mut out = Vec::new();
        header.write_to(&mut out).unwrap();

        assert_eq!(out.len(), header.encoded_len());
        assert_eq!(out.len(), 35);
        assert_eq!(&out[0..4], LocalFileHeader::SIGNATURE);
        assert_eq!(&out[4..6], &20u16.to_le_bytes());
        assert_eq!(&out[6..10], &[0, 0, 0, 0]);
        assert_eq!(&out[10..12], &0x5377u16.to_le_bytes());
        assert_eq!(&out[12..14], &0x5861u16.to_le_bytes());
        assert_eq!(&out[14..18], &0xDEAD_BEEFu32.to_le_bytes());
        assert_eq!(&out[18..22], &3u32.to_le_bytes());
        assert_eq!(&out[22..26], &3u32.to_le_bytes());
        assert_eq!(&out[26..28], &5u16.to_le_bytes());
        assert_eq!(&out[28..30], &[0, 0]);
        assert_eq!(&out[30..], b"a.txt");

        assert_eq!(LocalFileHeader::variable_lengths(&out).unwrap(), (5, 0));
    }

    #[test]
    fn central_header_layout_and_parse() {
        let header = CentralDirectoryHeader {
            modified: stamp(),
            crc32: 0x1234_5678,
            size: 42,
            lfh_offset: 1000,
            file_name: b"dir/b.bin",
        };
        let mut out = Vec::new();
        header.write_to(&mut out).unwrap();

        assert_eq!(out.len(), 46 + 9);
        assert_eq!(&out[0..4], CentralDirectoryHeader::SIGNATURE);
        assert_eq!(&out[4..6], &20u16.to_le_bytes());
        assert_eq!(&out[6..8], &20u16.to_le_bytes());
        assert_eq!(&out[32..42], &[0u8; 10]);
        assert_eq!(&out[42..46], &1000u32.to_le_bytes());

        let entry = ZipFileEntry::read_from(&mut Cursor::new(&out)).unwrap();
        assert_eq!(entry.file_name, "dir/b.bin");
        assert_eq!(entry.compression_method, CompressionMethod::Stored);
        assert_eq!(entry.crc32, 0x1234_5678);
        assert_eq!(entry.compressed_size, 42);
        assert_eq!(entry.uncompressed_size, 42);
        assert_eq!(entry.lfh_offset, 1000);
        assert_eq!(entry.modified, stamp());
        assert!(!entry.is_directory);
    }

    #[test]
    fn eocd_round_trip() {
        let eocd = EndOfCentralDirectory::new(2, 102, 75);
        let mut out = Vec::new();
        eocd.write_to(&mut out).unwrap();

        assert_eq!(out.len(), EndOfCentralDirectory::SIZE);
        let parsed = EndOfCentralDirectory::from_bytes(&out).unwrap();
        assert_eq!(parsed, eocd);
        assert!(!parsed.is_multi_disk());
    }

    #[test]
    fn rejects_bad_signatures() {
        assert!(EndOfCentralDirectory::from_bytes(&[0u8; 22]).is_err());
        assert!(EndOfCentralDirectory::from_bytes(b"PK\x05\x06").is_err());
        assert!(LocalFileHeader::variable_lengths(&[0u8; 30]).is_err());
        assert!(ZipFileEntry::read_from(&mut Cursor::new(vec![0u8; 46])).is_err());
    }

    #[test]
    fn compression_method_codes() {
        assert_eq!(CompressionMethod::from_u16(0), CompressionMethod::Stored);
        assert_eq!(CompressionMethod::from_u16(8), CompressionMethod::Deflate);
        assert_eq!(CompressionMethod::from_u16(12).as_u16(), 12);
    }
}
