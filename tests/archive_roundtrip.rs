//! Archives built by `ZipWriter`, read back by this crate's parser and by the
//! independent `zip` crate.

use std::io::{Cursor, Read};
use std::sync::Arc;

use cropzip::{MemoryReader, ZipExtractor, ZipWriter, crc32};

fn u16_at(buf: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([buf[at], buf[at + 1]])
}

fn u32_at(buf: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}

fn sample_entries() -> Vec<(String, Vec<u8>)> {
    vec![
        ("a.txt".to_string(), b"hi".to_vec()),
        ("b.bin".to_string(), vec![1, 2, 3]),
        ("empty.dat".to_string(), Vec::new()),
        ("nested/dir/file.raw".to_string(), (0..=255u8).cycle().take(5000).collect()),
        ("café-ß.jpg".to_string(), vec![0xFF; 17]),
    ]
}

fn build(entries: &[(String, Vec<u8>)]) -> Vec<u8> {
    let mut zip = ZipWriter::new();
    for (name, data) in entries {
        zip.add_file(name.as_str(), data.clone()).unwrap();
    }
    zip.build()
}

#[test]
fn two_file_scenario_length_and_checksums() {
    let mut zip = ZipWriter::new();
    zip.add_file("a.txt", b"hi".to_vec()).unwrap();
    zip.add_file("b.bin", vec![1u8, 2, 3]).unwrap();
    let bytes = zip.build();

    assert_eq!(
        bytes.len(),
        (30 + 5 + 2) + (30 + 5 + 3) + (46 + 5) + (46 + 5) + 22
    );

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    assert_eq!(archive.len(), 2);

    let expected: [(&str, &[u8]); 2] = [("a.txt", b"hi"), ("b.bin", &[1, 2, 3])];
    for (i, (name, data)) in expected.iter().enumerate() {
        let mut file = archive.by_index(i).unwrap();
        assert_eq!(file.name(), *name);
        assert_eq!(file.crc32(), crc32(data));
        assert_eq!(file.compression(), zip::CompressionMethod::Stored);
        let mut content = Vec::new();
        file.read_to_end(&mut content).unwrap();
        assert_eq!(content, *data);
    }
}

#[test]
fn zip_crate_reads_every_entry() {
    let entries = sample_entries();
    let mut archive = zip::ZipArchive::new(Cursor::new(build(&entries))).unwrap();
    assert_eq!(archive.len(), entries.len());

    for (i, (name, data)) in entries.iter().enumerate() {
        let mut file = archive.by_index(i).unwrap();
        // No UTF-8 flag is set, so compare the raw name bytes
        assert_eq!(file.name_raw(), name.as_bytes());
        assert_eq!(file.size(), data.len() as u64);
        assert_eq!(file.compressed_size(), data.len() as u64);
        assert_eq!(file.crc32(), crc32(data));
        let mut content = Vec::new();
        file.read_to_end(&mut content).unwrap();
        assert_eq!(&content, data);
    }
}

#[tokio::test]
async fn own_reader_round_trips_names_and_content() {
    let entries = sample_entries();
    let extractor = ZipExtractor::new(Arc::new(MemoryReader::new(build(&entries))));

    let listed = extractor.list_files().await.unwrap();
    assert_eq!(listed.len(), entries.len());
    for (entry, (name, data)) in listed.iter().zip(&entries) {
        assert_eq!(&entry.file_name, name);
        assert_eq!(entry.file_name_raw, name.as_bytes());
        assert_eq!(entry.uncompressed_size, data.len() as u64);
        assert_eq!(entry.crc32, crc32(data));
        assert_eq!(&extractor.extract_to_memory(entry).await.unwrap(), data);
    }
    assert!(extractor.verify().await.unwrap().is_empty());
}

#[test]
fn directory_fields_describe_the_layout() {
    let entries = sample_entries();
    let bytes = build(&entries);
    let eocd = bytes.len() - 22;

    assert_eq!(&bytes[eocd..eocd + 4], b"PK\x05\x06");
    assert_eq!(u16_at(&bytes, eocd + 8) as usize, entries.len());
    assert_eq!(u16_at(&bytes, eocd + 10) as usize, entries.len());

    let cd_size = u32_at(&bytes, eocd + 12) as usize;
    let cd_offset = u32_at(&bytes, eocd + 16) as usize;
    let expected_cd: usize = entries.iter().map(|(n, _)| 46 + n.len()).sum();
    let expected_local: usize = entries.iter().map(|(n, d)| 30 + n.len() + d.len()).sum();
    assert_eq!(cd_size, expected_cd);
    assert_eq!(cd_offset, expected_local);
    assert_eq!(cd_offset + cd_size, eocd);

    // Every central header points at a local header signature
    let mut at = cd_offset;
    for (name, _) in &entries {
        assert_eq!(&bytes[at..at + 4], b"PK\x01\x02");
        let lfh = u32_at(&bytes, at + 42) as usize;
        assert_eq!(&bytes[lfh..lfh + 4], b"PK\x03\x04");
        assert_eq!(&bytes[lfh + 30..lfh + 30 + name.len()], name.as_bytes());
        // Local and central headers agree on time, date, CRC and sizes
        assert_eq!(&bytes[lfh + 10..lfh + 26], &bytes[at + 12..at + 28]);
        at += 46 + name.len();
    }
    assert_eq!(at, eocd);
}

#[test]
fn empty_archive_opens_everywhere() {
    let bytes = ZipWriter::new().build();
    assert_eq!(bytes.len(), 22);
    assert_eq!(u32_at(&bytes, 12), 0);
    assert_eq!(u32_at(&bytes, 16), 0);

    let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    assert_eq!(archive.len(), 0);
}

#[test]
fn rebuild_is_byte_identical() {
    let mut zip = ZipWriter::new();
    for (name, data) in sample_entries() {
        zip.add_file(name, data).unwrap();
    }
    assert_eq!(zip.build(), zip.build());
}
