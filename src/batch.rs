//! Sequential recompression of several PDFs.

use crate::assemble::DocumentBuilder;
use crate::compress::{recompress, CompressionResult};
use crate::encode::ImageEncoder;
use crate::error::Result;
use crate::level::CompressionLevel;
use crate::progress::overall_progress;
use crate::render::PageRenderer;

/// A named input file held in memory
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        SourceFile {
            name: name.into(),
            bytes,
        }
    }
}

/// Results of a batch, in input order.
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    results: Vec<CompressionResult>,
}

impl BatchResult {
    pub fn results(&self) -> &[CompressionResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CompressionResult> {
        self.results.iter()
    }

    pub fn total_original(&self) -> u64 {
        self.results.iter().map(CompressionResult::original_size).sum()
    }

    pub fn total_new(&self) -> u64 {
        self.results.iter().map(CompressionResult::new_size).sum()
    }

    /// Bytes saved over the whole batch; negative when it grew overall
    pub fn total_saved(&self) -> i64 {
        self.total_original() as i64 - self.total_new() as i64
    }

    pub fn is_overall_gain(&self) -> bool {
        self.total_saved() > 0
    }

    pub fn into_results(self) -> Vec<CompressionResult> {
        self.results
    }
}

impl IntoIterator for BatchResult {
    type Item = CompressionResult;
    type IntoIter = std::vec::IntoIter<CompressionResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}

impl<'a> IntoIterator for &'a BatchResult {
    type Item = &'a CompressionResult;
    type IntoIter = std::slice::Iter<'a, CompressionResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

/// Recompress `files` one after another at the same level.
///
/// `on_progress` receives `(k * 100 + p) / N` while file `k` of `N` reports `p`.
/// The first failure aborts the batch: its error is returned as-is and the
/// remaining files are never opened.
pub fn run_batch<R, E, B>(
    renderer: &R,
    encoder: &E,
    mut new_builder: impl FnMut() -> B,
    files: &[SourceFile],
    level: CompressionLevel,
    mut on_progress: impl FnMut(f64),
) -> Result<BatchResult>
where
    R: PageRenderer,
    E: ImageEncoder,
    B: DocumentBuilder,
{
    let count = files.len();
    let mut results = Vec::with_capacity(count);

    for (index, file) in files.iter().enumerate() {
        log::info!("Processing file {} / {}: {}", index + 1, count, file.name);

        let result = recompress(
            renderer,
            encoder,
            new_builder(),
            &file.name,
            &file.bytes,
            level,
            |file_progress| on_progress(overall_progress(index, count, file_progress)),
        )
        .inspect_err(|e| log::error!("Batch aborted at {}: {}", file.name, e))?;

        results.push(result);
    }

    Ok(BatchResult { results })
}
