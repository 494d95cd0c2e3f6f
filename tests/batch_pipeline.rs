//! End-to-end batch runs over synthetic images on disk.

use std::collections::HashSet;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use cropzip::batch::{BatchOptions, run_batch};
use cropzip::imaging::{OutputFormat, Quality, RenderParams, decode};
use cropzip::crc32;
use image::{GenericImageView, Rgb, RgbImage};

fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 64]))
        .save(&path)
        .unwrap();
    path
}

fn options(format: OutputFormat, concurrency: usize) -> BatchOptions {
    BatchOptions {
        render: RenderParams {
            format,
            quality: Quality::new(0.7),
            width: 48,
            height: 48,
        },
        concurrency,
    }
}

#[tokio::test]
async fn converts_every_image_into_the_archive() {
    let tmp = tempfile::TempDir::new().unwrap();
    let inputs: Vec<PathBuf> = (0..7)
        .map(|i| write_png(tmp.path(), &format!("img{i}.png"), 60 + i * 10, 40))
        .collect();

    let report = run_batch(inputs, &options(OutputFormat::Png, 3), |_| {})
        .await
        .unwrap();
    assert_eq!(report.succeeded(), 7);
    assert_eq!(report.failed(), 0);

    let mut archive = zip::ZipArchive::new(Cursor::new(report.archive)).unwrap();
    assert_eq!(archive.len(), 7);

    let mut names = HashSet::new();
    for i in 0..archive.len() {
        let mut file = archive.by_index(i).unwrap();
        names.insert(file.name().to_string());
        let mut content = Vec::new();
        file.read_to_end(&mut content).unwrap();
        assert_eq!(file.crc32(), crc32(&content));
        assert_eq!(decode(&content).unwrap().dimensions(), (48, 48));
    }
    let expected: HashSet<String> = (0..7).map(|i| format!("img{i}.png")).collect();
    assert_eq!(names, expected);
}

#[tokio::test]
async fn failures_are_skipped_and_counted() {
    let tmp = tempfile::TempDir::new().unwrap();
    let good = write_png(tmp.path(), "good.png", 32, 64);
    let broken = tmp.path().join("broken.png");
    std::fs::write(&broken, b"not really a png").unwrap();
    let missing = tmp.path().join("missing.jpg");

    let mut failed_indices = Vec::new();
    let report = run_batch(
        vec![broken, good, missing],
        &options(OutputFormat::Jpeg, 2),
        |outcome| {
            if !outcome.is_added() {
                failed_indices.push(outcome.index());
            }
        },
    )
    .await
    .unwrap();

    failed_indices.sort();
    assert_eq!(failed_indices, vec![0, 2]);
    assert_eq!(report.succeeded(), 1);
    assert_eq!(report.failed(), 2);

    // End record counts only what was added
    let eocd = report.archive.len() - 22;
    assert_eq!(u16::from_le_bytes([report.archive[eocd + 10], report.archive[eocd + 11]]), 1);

    let mut archive = zip::ZipArchive::new(Cursor::new(report.archive)).unwrap();
    let file = archive.by_index(0).unwrap();
    assert_eq!(file.name(), "good.jpg");
}

#[tokio::test]
async fn groups_preserve_input_order_across_groups() {
    let tmp = tempfile::TempDir::new().unwrap();
    let inputs: Vec<PathBuf> = (0..6)
        .map(|i| write_png(tmp.path(), &format!("p{i}.png"), 20, 20))
        .collect();

    let report = run_batch(inputs, &options(OutputFormat::Webp, 2), |_| {})
        .await
        .unwrap();

    // Completion order may shuffle within a group of two, never across groups
    let indices: Vec<usize> = report.outcomes.iter().map(|o| o.index()).collect();
    for (group, pair) in indices.chunks(2).enumerate() {
        let mut pair = pair.to_vec();
        pair.sort();
        assert_eq!(pair, vec![group * 2, group * 2 + 1]);
    }
}
