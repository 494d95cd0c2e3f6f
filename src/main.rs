//! Main entry point for the cropzip CLI application.
//!
//! Converts the given images into fixed-size squares, packs them into a
//! stored ZIP archive built in memory, and writes the archive to disk.

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cropzip::batch::{ItemOutcome, archive_file_name, run_batch};
use cropzip::imaging::is_image_path;
use cropzip::{Cli, LocalFileReader, MemoryReader, ReadAt, ZipExtractor};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(ref archive) = cli.list_archive {
        let reader = Arc::new(LocalFileReader::new(archive)?);
        let extractor = ZipExtractor::new(reader);
        list_files(&extractor, cli.verbose).await?;
        return test_archive(&extractor, &archive.display().to_string(), &cli).await;
    }

    let inputs = select_inputs(&cli);
    if inputs.is_empty() {
        bail!("No image files to process");
    }

    let archive_path = run(inputs, &cli).await?;
    if !cli.is_very_quiet() {
        eprintln!("Wrote {}", archive_path.display());
    }

    Ok(())
}

/// Keep only files that look like decodable images, reporting the rest.
fn select_inputs(cli: &Cli) -> Vec<PathBuf> {
    cli.inputs
        .iter()
        .filter(|path| {
            let keep = is_image_path(path);
            if !keep && !cli.is_quiet() {
                eprintln!("Skipping: {} (not a supported image)", path.display());
            }
            keep
        })
        .cloned()
        .collect()
}

/// Convert the batch, write the archive and optionally list or test it.
///
/// Returns the path of the written archive.
async fn run(inputs: Vec<PathBuf>, cli: &Cli) -> Result<PathBuf> {
    let options = cli.batch_options();
    let total = inputs.len();

    if !cli.is_quiet() {
        eprintln!("Processing {} images...", total);
    }

    let pb = if cli.is_quiet() {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(total as u64)
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    let mut completed = 0usize;
    let report = run_batch(inputs, &options, |outcome| {
        pb.inc(1);
        match outcome {
            ItemOutcome::Added { entry_name, .. } => {
                completed += 1;
                if !cli.is_quiet() {
                    pb.println(format!("{}/{} Done: {}", completed, total, entry_name));
                }
            }
            ItemOutcome::Failed { index, path, error } => {
                if !cli.is_very_quiet() {
                    pb.println(format!(
                        "Error ({}/{}): {} - {}",
                        index + 1,
                        total,
                        path.display(),
                        error
                    ));
                }
            }
        }
    })
    .await?;
    pb.finish_and_clear();

    if !cli.is_quiet() {
        eprintln!(
            "{} of {} images added, {} failed ({})",
            report.succeeded(),
            total,
            report.failed(),
            format_size(report.archive.len() as u64)
        );
    }

    tokio::fs::create_dir_all(&cli.output_dir)
        .await
        .with_context(|| format!("Failed to create {}", cli.output_dir.display()))?;
    let archive_path = cli.output_dir.join(archive_file_name(
        options.render.width,
        options.render.height,
        Utc::now().timestamp_millis(),
    ));
    tokio::fs::write(&archive_path, &report.archive)
        .await
        .with_context(|| format!("Failed to write {}", archive_path.display()))?;

    if cli.list || cli.verbose || cli.test {
        let extractor = ZipExtractor::new(Arc::new(MemoryReader::new(report.archive)));
        if cli.list || cli.verbose {
            list_files(&extractor, cli.verbose).await?;
        }
        if cli.test {
            test_archive(&extractor, &file_name_of(&archive_path), cli).await?;
        }
    }

    Ok(archive_path)
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// List files in the ZIP archive.
///
/// Supports two output formats:
/// - Simple format (`-l`): Just file names, one per line
/// - Verbose format (`-v`): Table with size, CRC-32 and timestamps
async fn list_files<R: ReadAt + 'static>(extractor: &ZipExtractor<R>, verbose: bool) -> Result<()> {
    let entries = extractor.list_files().await?;

    if verbose {
        println!(
            "{:>10}  {:>8}  {:>10}  {:>5}  Name",
            "Length", "CRC-32", "Date", "Time"
        );
        println!("{}", "-".repeat(60));
    }

    let mut total_size = 0u64;

    for entry in &entries {
        if verbose {
            let (year, month, day) = entry.modified.year_month_day();
            let (hour, minute, _second) = entry.modified.hour_minute_second();
            println!(
                "{:>10}  {:08x}  {:04}-{:02}-{:02}  {:02}:{:02}  {}",
                entry.uncompressed_size,
                entry.crc32,
                year,
                month,
                day,
                hour,
                minute,
                entry.file_name
            );
            total_size += entry.uncompressed_size;
        } else {
            println!("{}", entry.file_name);
        }
    }

    if verbose {
        println!("{}", "-".repeat(60));
        println!("{:>10}  {:>29}  {} files", total_size, "", entries.len());
    }

    Ok(())
}

/// Re-read every entry and check its CRC-32, like `unzip -t`.
async fn test_archive<R: ReadAt + 'static>(
    extractor: &ZipExtractor<R>,
    name: &str,
    cli: &Cli,
) -> Result<()> {
    let mismatches = extractor.verify().await?;
    if mismatches.is_empty() {
        if !cli.is_very_quiet() {
            println!("No errors detected in {}.", name);
        }
        return Ok(());
    }

    for m in &mismatches {
        eprintln!(
            "  bad CRC {:08x} (should be {:08x}): {}",
            m.actual, m.expected, m.file_name
        );
    }
    bail!("{} of the entries in {} are corrupt", mismatches.len(), name)
}

/// Format a byte size into a human-readable string.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(format_size(500), "500 bytes");
/// assert_eq!(format_size(1536), "1.50 KB");
/// assert_eq!(format_size(1048576), "1.00 MB");
/// ```
fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
