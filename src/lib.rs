//! # cropzip
//!
//! Square-crop a batch of images and pack the results into a ZIP archive
//! assembled entirely in memory.
//!
//! The heart of the crate is [`ZipWriter`], an in-memory builder for stored
//! (uncompressed) ZIP archives. The rest is glue around it:
//!
//! - [`imaging`]: decode, cover-crop onto a fixed canvas, re-encode
//! - [`batch`]: bounded-concurrency conversion feeding a single writer
//! - [`zip`]: the writer plus a reader used to list and verify archives
//! - [`io`]: random-access sources (memory, local file) for the reader
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use cropzip::{MemoryReader, ZipExtractor, ZipWriter};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut zip = ZipWriter::new();
//!     zip.add_file("hello.txt", b"hello".to_vec())?;
//!     let bytes = zip.build();
//!
//!     let extractor = ZipExtractor::new(Arc::new(MemoryReader::new(bytes)));
//!     for file in extractor.list_files().await? {
//!         println!("{} ({} bytes)", file.file_name, file.uncompressed_size);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod batch;
pub mod cli;
pub mod imaging;
pub mod io;
pub mod zip;

pub use batch::{BatchOptions, BatchReport, ItemOutcome, run_batch};
pub use cli::Cli;
pub use io::{LocalFileReader, MemoryReader, ReadAt};
pub use zip::{ArchiveEntry, DosDateTime, ZipExtractor, ZipFileEntry, ZipWriteError, ZipWriter, crc32};
