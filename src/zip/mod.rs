//! ZIP archive writing and reading.
//!
//! ## Architecture
//!
//! - [`crc`]: CRC-32 checksum with a compile-time lookup table
//! - [`dostime`]: packed MS-DOS date/time fields
//! - [`structures`]: fixed-layout records (local header, central header, EOCD)
//! - [`writer`]: the in-memory archive builder
//! - [`parser`] / [`extractor`]: a reader used to list and verify archives
//!
//! ## ZIP Format Overview
//!
//! A ZIP file consists of:
//! 1. Local file headers and file data for each entry
//! 2. Central Directory with metadata for all entries
//! 3. End of Central Directory (EOCD) record at the end
//!
//! ## Limitations
//!
//! - Entries are always STORED; nothing is compressed
//! - No ZIP64, encryption or multi-disk support
//! - File names are written as raw UTF-8 without the language-encoding flag,
//!   so readers that assume CP437 may show non-ASCII names differently

pub mod crc;
pub mod dostime;
mod extractor;
mod parser;
mod structures;
mod writer;

pub use crc::{Crc32, crc32};
pub use dostime::DosDateTime;
pub use extractor::{CrcMismatch, ZipExtractor};
pub use parser::ZipParser;
pub use structures::*;
pub use writer::{ArchiveEntry, ZipWriteError, ZipWriter};
