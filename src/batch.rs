//! Bounded-concurrency batch conversion into a single archive.
//!
//! Inputs are taken in fixed groups of [`BatchOptions::concurrency`]. Every
//! image in a group is converted on tokio's blocking pool; as each
//! conversion finishes, its output is appended to the one [`ZipWriter`]
//! owned by the batch loop. Entry order therefore follows completion order
//! inside a group, and group order across groups.
//!
//! A failing image is recorded as [`ItemOutcome::Failed`] and never reaches
//! the archive; the rest of the batch carries on. This includes a decoder
//! that panics.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::ImageFormat;
use thiserror::Error;
use tokio::task::JoinSet;

use crate::imaging::{self, ConvertError, RenderParams, entry_extension};
use crate::zip::{ZipWriteError, ZipWriter};

/// Number of conversions in flight at once unless configured otherwise.
pub const DEFAULT_CONCURRENCY: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchOptions {
    pub render: RenderParams,
    pub concurrency: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            render: RenderParams::default(),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

/// Why a single input did not make it into the archive.
#[derive(Error, Debug)]
pub enum ItemError {
    #[error(transparent)]
    Convert(#[from] ConvertError),
    #[error("cannot add to archive: {0}")]
    Archive(#[from] ZipWriteError),
    #[error("conversion panicked: {0}")]
    Panicked(String),
}

/// Result of processing one input, in completion order.
#[derive(Debug)]
pub enum ItemOutcome {
    Added {
        /// Position of the input in the original list.
        index: usize,
        path: PathBuf,
        entry_name: String,
        size: usize,
    },
    Failed {
        index: usize,
        path: PathBuf,
        error: ItemError,
    },
}

impl ItemOutcome {
    pub fn index(&self) -> usize {
        match self {
            ItemOutcome::Added { index, .. } | ItemOutcome::Failed { index, .. } => *index,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            ItemOutcome::Added { path, .. } | ItemOutcome::Failed { path, .. } => path,
        }
    }

    pub fn is_added(&self) -> bool {
        matches!(self, ItemOutcome::Added { .. })
    }
}

/// Archive bytes plus the per-input outcomes.
#[derive(Debug)]
pub struct BatchReport {
    pub archive: Vec<u8>,
    pub outcomes: Vec<ItemOutcome>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_added()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

/// Archive entry name for a converted input: its stem plus the output extension.
pub fn entry_name(path: &Path, render: &RenderParams) -> String {
    let base = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let source_mime = ImageFormat::from_path(path).ok().map(|f| f.to_mime_type());
    format!("{}.{}", base, entry_extension(render.format.mime(), source_mime))
}

/// File name offered for the finished archive.
pub fn archive_file_name(width: u32, height: u32, unix_millis: i64) -> String {
    format!("batch_cropped_{width}x{height}_{unix_millis}.zip")
}

type Converter = fn(&Path, &RenderParams) -> Result<Vec<u8>, ConvertError>;

fn convert_file(path: &Path, render: &RenderParams) -> Result<Vec<u8>, ConvertError> {
    let bytes = std::fs::read(path)?;
    imaging::convert(&bytes, render)
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Convert every input and pack the results into one stored ZIP archive.
///
/// `on_item` is called once per input as soon as its outcome is known.
/// Every failure, a panicking decoder included, is reported per item.
pub async fn run_batch<F>(
    inputs: Vec<PathBuf>,
    options: &BatchOptions,
    on_item: F,
) -> Result<BatchReport>
where
    F: FnMut(&ItemOutcome),
{
    run_batch_with(inputs, options, convert_file, on_item).await
}

async fn run_batch_with<F>(
    inputs: Vec<PathBuf>,
    options: &BatchOptions,
    convert: Converter,
    mut on_item: F,
) -> Result<BatchReport>
where
    F: FnMut(&ItemOutcome),
{
    let render = options.render;
    let width = options.concurrency.max(1);

    let mut zip = ZipWriter::new();
    let mut outcomes = Vec::with_capacity(inputs.len());

    let indexed: Vec<(usize, PathBuf)> = inputs.into_iter().enumerate().collect();
    for group in indexed.chunks(width) {
        let mut tasks = JoinSet::new();
        for (index, path) in group.iter().cloned() {
            tasks.spawn_blocking(move || {
                let result = panic::catch_unwind(AssertUnwindSafe(|| convert(&path, &render)));
                (index, path, result)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            // Panics are caught inside the task, so only cancellation lands here
            let (index, path, result) = joined.context("Conversion task was cancelled")?;
            let outcome = match result {
                Err(payload) => ItemOutcome::Failed {
                    index,
                    path,
                    error: ItemError::Panicked(panic_message(payload)),
                },
                Ok(Ok(data)) => {
                    let entry_name = entry_name(&path, &render);
                    let size = data.len();
                    match zip.add_file(entry_name.as_str(), data) {
                        Ok(()) => ItemOutcome::Added {
                            index,
                            path,
                            entry_name,
                            size,
                        },
                        Err(e) => ItemOutcome::Failed {
                            index,
                            path,
                            error: e.into(),
                        },
                    }
                }
                Ok(Err(e)) => ItemOutcome::Failed {
                    index,
                    path,
                    error: e.into(),
                },
            };
            on_item(&outcome);
            outcomes.push(outcome);
        }
    }

    Ok(BatchReport {
        archive: zip.build(),
        outcomes,
    })
}
